use relsql::qualifier_parser::parse_qualifier;
use relsql::sql_ast::{ObjectId, Value};
use relsql::translator::{
    DeleteQuery, InsertQuery, JoinPlanningError, QueryParameters, TranslationError, UpdateQuery,
};
use relsql::EngineError;

use super::common::generic_engine;

#[test]
fn test_insert_expands_relationship_to_foreign_keys() {
    let engine = generic_engine();
    let pk = ObjectId::new("CompoundPk").with("KEY1", 7).with("KEY2", "b");
    let query = InsertQuery::new("CompoundFk")
        .value("pkey", 1)
        .value("name", "row")
        .value("toCompoundPk", pk);

    let translated = engine.translate_insert(&query).unwrap();
    assert_eq!(
        translated.sql,
        "INSERT INTO COMPOUND_FK_TEST (PKEY, NAME, F_KEY1, F_KEY2) VALUES (?, ?, ?, ?)"
    );
    assert_eq!(translated.bindings.len(), 4);
    assert_eq!(translated.bindings[2].value, Value::Int(7));
}

#[test]
fn test_update_with_qualifier() {
    let engine = generic_engine();
    let query = UpdateQuery::new("Painting")
        .set("estimatedPrice", 1200.5)
        .qualifier(parse_qualifier("paintingId = $id").unwrap())
        .parameters(QueryParameters::default().with_named("id", 33));

    let translated = engine.translate_update(&query).unwrap();
    assert_eq!(
        translated.sql,
        "UPDATE PAINTING SET ESTIMATED_PRICE = ? WHERE PAINTING_ID = ?"
    );
    assert_eq!(translated.bindings[1].value, Value::Int(33));
}

#[test]
fn test_delete_rejects_joined_paths() {
    let engine = generic_engine();
    let query = DeleteQuery::new("Painting")
        .qualifier(parse_qualifier("toArtist.artistName = 'Monet'").unwrap());

    assert!(matches!(
        engine.translate_delete(&query),
        Err(EngineError::Translation(TranslationError::JoinPlanning(
            JoinPlanningError::JoinNotAllowed { .. }
        )))
    ));

    let by_id = DeleteQuery::new("Painting").qualifier(parse_qualifier("paintingId = 4").unwrap());
    assert_eq!(
        engine.translate_delete(&by_id).unwrap().sql,
        "DELETE FROM PAINTING WHERE PAINTING_ID = ?"
    );
}

#[test]
fn test_dependent_to_one_cannot_be_assigned() {
    let engine = generic_engine();
    let profile = ObjectId::new("Profile").with("PROFILE_ID", 5);
    let query = InsertQuery::new("Artist")
        .value("artistId", 1)
        .value("toProfile", profile);

    assert!(matches!(
        engine.translate_insert(&query),
        Err(EngineError::Translation(TranslationError::JoinPlanning(
            JoinPlanningError::KeyCountMismatch { .. }
        )))
    ));
}
