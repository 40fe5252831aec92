use chrono::NaiveDate;
use relsql::qualifier_parser::parse_qualifier;
use relsql::sql_ast::{JdbcType, ObjectId, Value};
use relsql::translator::{
    JoinPlanningError, Ordering, QueryParameters, SchemaResolutionError, SelectQuery,
    TranslationError, TranslationStateError,
};
use relsql::EngineError;

use super::common::generic_engine;

fn select(entity: &str, qualifier: &str, params: QueryParameters) -> SelectQuery {
    SelectQuery::new(entity)
        .qualifier(parse_qualifier(qualifier).unwrap())
        .parameters(params)
}

#[test]
fn test_generic_select_with_like_and_date() {
    let engine = generic_engine();
    let params = QueryParameters::default()
        .with_named("name", "a%")
        .with_named("dob", NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
    let query = select("Artist", "artistName like $name and dateOfBirth > $dob", params);

    let translated = engine.translate_select(&query).unwrap();
    assert_eq!(
        translated.sql,
        "SELECT ARTIST_ID, ARTIST_NAME, DATE_OF_BIRTH FROM ARTIST WHERE ARTIST_NAME LIKE ? AND DATE_OF_BIRTH > ?"
    );
    assert_eq!(translated.bindings.len(), 2);
    assert_eq!(translated.bindings[0].value, Value::String("a%".to_string()));
    assert_eq!(translated.bindings[0].jdbc_type, JdbcType::Char);
    assert_eq!(translated.bindings[1].jdbc_type, JdbcType::Date);
}

#[test]
fn test_translation_is_deterministic() {
    let engine = generic_engine();
    let query = select(
        "Painting",
        "toArtist.artistName = 'Monet' or toGallery.galleryName like 'L%'",
        QueryParameters::default(),
    )
    .order_by(Ordering::desc("estimatedPrice"))
    .limit(5);

    let first = engine.translate_select(&query).unwrap();
    let second = engine.translate_select(&query).unwrap();
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.binding_values(), second.binding_values());
}

#[test]
fn test_repeated_path_reuses_one_join() {
    let engine = generic_engine();
    let query = select(
        "Painting",
        "toArtist.artistName = 'Monet' and toArtist.dateOfBirth < $dob",
        QueryParameters::default().with_named("dob", NaiveDate::from_ymd_opt(1850, 1, 1).unwrap()),
    );

    let translated = engine.translate_select(&query).unwrap();
    assert_eq!(
        translated.sql,
        "SELECT t0.PAINTING_ID, t0.PAINTING_TITLE, t0.ESTIMATED_PRICE, t0.ARTIST_ID, t0.GALLERY_ID \
         FROM PAINTING t0 JOIN ARTIST t1 ON t0.ARTIST_ID = t1.ARTIST_ID \
         WHERE t1.ARTIST_NAME = ? AND t1.DATE_OF_BIRTH < ?"
    );
    assert_eq!(translated.sql.matches("JOIN ARTIST").count(), 1);
}

#[test]
fn test_distinct_paths_get_distinct_aliases() {
    let engine = generic_engine();
    let query = select(
        "ArtistExhibit",
        "toArtist.artistName = 'A' and toExhibit.toGallery.paintingArray.toArtist.artistName = 'B'",
        QueryParameters::default(),
    );

    let sql = engine.translate_select(&query).unwrap().sql;
    assert_eq!(sql.matches("JOIN ARTIST ").count(), 2, "two artist joins expected: {}", sql);
    assert!(sql.contains("JOIN ARTIST t1 ON t0.ARTIST_ID = t1.ARTIST_ID"), "{}", sql);
    assert!(sql.contains("JOIN ARTIST t5 ON t4.ARTIST_ID = t5.ARTIST_ID"), "{}", sql);
    assert!(sql.contains("t1.ARTIST_NAME = ? AND t5.ARTIST_NAME = ?"), "{}", sql);
    // paintingArray is to-many
    assert!(sql.starts_with("SELECT DISTINCT "), "{}", sql);
}

#[test]
fn test_outer_join_segment() {
    let engine = generic_engine();
    let query = select("Employee", "toManager+.name = 'Boss'", QueryParameters::default());

    let sql = engine.translate_select(&query).unwrap().sql;
    assert!(
        sql.contains("LEFT JOIN EMPLOYEE t1 ON t0.MANAGER_ID = t1.EMPLOYEE_ID"),
        "{}",
        sql
    );
    assert!(sql.ends_with("WHERE t1.NAME = ?"), "{}", sql);
}

#[test]
fn test_compound_key_equality_expands_to_and() {
    let engine = generic_engine();
    let id = ObjectId::new("CompoundPk").with("KEY1", 3).with("KEY2", "aaa");
    let query = select(
        "CompoundFk",
        "toCompoundPk = $id",
        QueryParameters::default().with_named("id", id),
    );

    let translated = engine.translate_select(&query).unwrap();
    assert_eq!(
        translated.sql,
        "SELECT PKEY, NAME, F_KEY1, F_KEY2 FROM COMPOUND_FK_TEST WHERE F_KEY1 = ? AND F_KEY2 = ?"
    );
    assert_eq!(
        translated.binding_values(),
        vec![&Value::Int(3), &Value::String("aaa".to_string())]
    );
}

#[test]
fn test_compound_key_inequality_expands_to_or() {
    let engine = generic_engine();
    let id = ObjectId::new("CompoundPk").with("KEY1", 3).with("KEY2", "aaa");
    let query = select(
        "CompoundFk",
        "toCompoundPk <> $id and name = 'x'",
        QueryParameters::default().with_named("id", id),
    );

    let translated = engine.translate_select(&query).unwrap();
    assert!(
        translated.sql.ends_with("WHERE (F_KEY1 <> ? OR F_KEY2 <> ?) AND NAME = ?"),
        "{}",
        translated.sql
    );
    assert_eq!(
        translated.binding_values(),
        vec![
            &Value::Int(3),
            &Value::String("aaa".to_string()),
            &Value::String("x".to_string())
        ]
    );
}

#[test]
fn test_to_many_join_forces_distinct() {
    let engine = generic_engine();
    let query = select("Artist", "paintingArray.paintingTitle like 'S%'", QueryParameters::default());
    let sql = engine.translate_select(&query).unwrap().sql;
    assert!(sql.starts_with("SELECT DISTINCT t0.ARTIST_ID"), "{}", sql);

    let suppressed = engine.translate_select(&query.clone().suppress_distinct(true)).unwrap().sql;
    assert!(suppressed.starts_with("SELECT t0.ARTIST_ID"), "{}", suppressed);
}

#[test]
fn test_ordering_and_pagination() {
    let engine = generic_engine();
    let query = SelectQuery::new("Artist")
        .order_by(Ordering::asc("artistName").ignore_case())
        .limit(10)
        .offset(20);

    let sql = engine.translate_select(&query).unwrap().sql;
    assert_eq!(
        sql,
        "SELECT ARTIST_ID, ARTIST_NAME, DATE_OF_BIRTH FROM ARTIST ORDER BY UPPER(ARTIST_NAME) LIMIT 10 OFFSET 20"
    );
}

#[test]
fn test_error_categories() {
    let engine = generic_engine();
    let params = QueryParameters::default();

    let err = engine.translate_select(&select("Artist", "artistNam = 1", params.clone())).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Translation(TranslationError::SchemaResolution(SchemaResolutionError::UnknownAttribute { .. }))
    ));

    let err = engine.translate_select(&SelectQuery::new("Sculpture")).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Translation(TranslationError::SchemaResolution(SchemaResolutionError::UnknownEntity { .. }))
    ));

    let err = engine.translate_select(&select("Artist", "artistName = $missing", params.clone())).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Translation(TranslationError::TranslationState(TranslationStateError::UnboundParameter { .. }))
    ));

    let partial = ObjectId::new("CompoundPk").with("KEY1", 3);
    let err = engine
        .translate_select(&select(
            "CompoundFk",
            "toCompoundPk = $id",
            QueryParameters::default().with_named("id", partial),
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Translation(TranslationError::JoinPlanning(JoinPlanningError::IncompleteObjectId { .. }))
    ));

    let err = engine.translate_select(&select("Artist", "frobnicate(artistName) = 1", params)).unwrap_err();
    assert!(matches!(err, EngineError::Translation(TranslationError::UnsupportedConstruct(_))));
}

#[test]
fn test_translate_qualifier_shortcut() {
    let engine = generic_engine();
    let translated = engine
        .translate_qualifier("Gallery", "galleryName in ('Louvre', 'Orsay')", QueryParameters::default())
        .unwrap();
    assert_eq!(
        translated.sql,
        "SELECT GALLERY_ID, GALLERY_NAME FROM GALLERY WHERE GALLERY_NAME IN (?, ?)"
    );
    assert_eq!(translated.bindings.len(), 2);
}

#[test]
fn test_join_collapses_across_to_many_continuation() {
    let engine = generic_engine();
    let query = select(
        "Painting",
        "toArtist.paintingArray.paintingTitle = 'Water Lilies' and toArtist.artistName = 'Monet'",
        QueryParameters::default(),
    );

    let sql = engine.translate_select(&query).unwrap().sql;
    assert_eq!(sql.matches("JOIN ARTIST ").count(), 1, "{}", sql);
    assert!(sql.contains("JOIN ARTIST t1 ON t0.ARTIST_ID = t1.ARTIST_ID"), "{}", sql);
    assert!(sql.contains("JOIN PAINTING t2 ON t1.ARTIST_ID = t2.ARTIST_ID"), "{}", sql);
    assert!(sql.ends_with("WHERE t2.PAINTING_TITLE = ? AND t1.ARTIST_NAME = ?"), "{}", sql);
}

#[test]
fn test_reflexive_paths_dedup_per_distinct_path() {
    let engine = generic_engine();
    let query = select(
        "Employee",
        "toManager.name = 'a' and toManager.toManager.name = 'b' and toManager.name = 'c'",
        QueryParameters::default(),
    );

    let sql = engine.translate_select(&query).unwrap().sql;
    assert_eq!(sql.matches("JOIN EMPLOYEE ").count(), 2, "{}", sql);
    assert!(sql.contains("JOIN EMPLOYEE t1 ON t0.MANAGER_ID = t1.EMPLOYEE_ID"), "{}", sql);
    assert!(sql.contains("JOIN EMPLOYEE t2 ON t1.MANAGER_ID = t2.EMPLOYEE_ID"), "{}", sql);
    assert!(!sql.contains("t3"), "{}", sql);
    assert!(sql.ends_with("WHERE t1.NAME = ? AND t2.NAME = ? AND t1.NAME = ?"), "{}", sql);
}

#[test]
fn test_dependent_to_one_joins_target_key() {
    let engine = generic_engine();
    let id = ObjectId::new("Profile").with("PROFILE_ID", 5);
    let query = select("Artist", "toProfile = $id", QueryParameters::default().with_named("id", id));

    let translated = engine.translate_select(&query).unwrap();
    assert_eq!(
        translated.sql,
        "SELECT t0.ARTIST_ID, t0.ARTIST_NAME, t0.DATE_OF_BIRTH FROM ARTIST t0 \
         JOIN ARTIST_PROFILE t1 ON t0.ARTIST_ID = t1.ARTIST_ID WHERE t1.PROFILE_ID = ?"
    );
    assert_eq!(translated.binding_values(), vec![&Value::Int(5)]);
    assert_eq!(translated.bindings[0].jdbc_type, JdbcType::Integer);
}

#[test]
fn test_dependent_to_one_null_comparison() {
    let engine = generic_engine();
    let sql = engine
        .translate_select(&select("Artist", "toProfile = null", QueryParameters::default()))
        .unwrap()
        .sql;
    assert!(sql.contains("JOIN ARTIST_PROFILE t1 ON t0.ARTIST_ID = t1.ARTIST_ID"), "{}", sql);
    assert!(sql.ends_with("WHERE t1.PROFILE_ID IS NULL"), "{}", sql);

    let sql = engine
        .translate_select(&select("Artist", "toProfile+ = null", QueryParameters::default()))
        .unwrap()
        .sql;
    assert!(sql.contains("LEFT JOIN ARTIST_PROFILE t1"), "{}", sql);
    assert!(sql.ends_with("WHERE t1.PROFILE_ID IS NULL"), "{}", sql);
}

#[test]
fn test_prefetch_outer_joins_target_columns() {
    let engine = generic_engine();
    let query = SelectQuery::new("Painting").prefetch("toArtist");

    let translated = engine.translate_select(&query).unwrap();
    assert_eq!(
        translated.sql,
        "SELECT t0.PAINTING_ID, t0.PAINTING_TITLE, t0.ESTIMATED_PRICE, t0.ARTIST_ID, t0.GALLERY_ID, \
         t1.ARTIST_ID, t1.ARTIST_NAME, t1.DATE_OF_BIRTH \
         FROM PAINTING t0 LEFT JOIN ARTIST t1 ON t0.ARTIST_ID = t1.ARTIST_ID"
    );

    // Prefetch joins only serve outer-joined qualifier paths
    let query = select("Painting", "toArtist+.artistName = 'Monet'", QueryParameters::default())
        .prefetch("toArtist");
    let sql = engine.translate_select(&query).unwrap().sql;
    assert_eq!(sql.matches("JOIN ARTIST ").count(), 1, "{}", sql);
    assert!(sql.ends_with("WHERE t1.ARTIST_NAME = ?"), "{}", sql);
}
