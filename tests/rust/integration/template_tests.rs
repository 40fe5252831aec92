use relsql::sql_ast::{JdbcType, Value};
use relsql::translator::{QueryParameters, TranslationError, TranslationStateError};
use relsql::EngineError;

use super::common::generic_engine;

const ARTIST_BY_NAME: &str =
    "SELECT * FROM ARTIST #if(name) WHERE ARTIST_NAME = #bind($name 'VARCHAR') #end";

#[test]
fn test_false_condition_leaves_empty_section() {
    let engine = generic_engine();
    let translated = engine
        .translate_template("SELECT * FROM ME #if(cond) WHERE X #end", &QueryParameters::default())
        .unwrap();
    assert_eq!(translated.sql, "SELECT * FROM ME ");
    assert!(translated.bindings.is_empty());
}

#[test]
fn test_true_condition_binds_parameter() {
    let engine = generic_engine();
    let params = QueryParameters::default().with_named("name", "Monet");
    let translated = engine.translate_template(ARTIST_BY_NAME, &params).unwrap();
    assert!(
        translated.sql.contains("WHERE ARTIST_NAME = ?"),
        "{}",
        translated.sql
    );
    assert_eq!(translated.bindings.len(), 1);
    assert_eq!(translated.bindings[0].jdbc_type, JdbcType::Varchar);
    assert_eq!(translated.bindings[0].value, Value::String("Monet".to_string()));
}

#[test]
fn test_else_branch() {
    let engine = generic_engine();
    let source = "SELECT * FROM ARTIST ORDER BY #if(byDate)DATE_OF_BIRTH#else ARTIST_NAME#end";
    let by_name = engine.translate_template(source, &QueryParameters::default()).unwrap();
    assert!(by_name.sql.ends_with("ARTIST_NAME"), "{}", by_name.sql);

    let params = QueryParameters::default().with_named("byDate", true);
    let by_date = engine.translate_template(source, &params).unwrap();
    assert!(by_date.sql.ends_with("DATE_OF_BIRTH"), "{}", by_date.sql);
}

#[test]
fn test_list_binds_one_placeholder_per_element() {
    let engine = generic_engine();
    let params = QueryParameters::default()
        .with_named("ids", Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
    let translated = engine
        .translate_template("SELECT * FROM ARTIST WHERE ARTIST_ID IN (#bind($ids 'BIGINT'))", &params)
        .unwrap();
    assert_eq!(translated.sql, "SELECT * FROM ARTIST WHERE ARTIST_ID IN (?, ?, ?)");
    assert_eq!(translated.bindings.len(), 3);
    assert!(translated.bindings.iter().all(|b| b.is_array && b.jdbc_type == JdbcType::BigInt));
}

#[test]
fn test_template_errors() {
    let engine = generic_engine();
    let params = QueryParameters::default();

    assert!(matches!(
        engine.translate_template("SELECT 1 #if(x) A", &params),
        Err(EngineError::Translation(TranslationError::TranslationState(
            TranslationStateError::TemplateSyntax { .. }
        )))
    ));
    assert!(matches!(
        engine.translate_template("SELECT * FROM ARTIST WHERE ARTIST_ID = #bind($id)", &params),
        Err(EngineError::Translation(TranslationError::TranslationState(
            TranslationStateError::UnboundParameter { .. }
        )))
    ));
}
