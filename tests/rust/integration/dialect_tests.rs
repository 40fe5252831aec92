use relsql::dialect::{process, DialectRegistry, DialectType};
use relsql::qualifier_parser::parse_qualifier;
use relsql::translator::{
    translate_select, Ordering, QueryParameters, SelectQuery, TranslationError, TranslationOptions,
    UnsupportedConstructError,
};
use relsql::{Engine, EngineError, TranslatorConfig};
use test_case::test_case;

use super::common::{catalog, engine};

fn ignore_case_query() -> SelectQuery {
    SelectQuery::new("Artist").qualifier(parse_qualifier("artistName likeIgnoreCase 'mo%'").unwrap())
}

#[test_case(DialectType::Generic, "WHERE UPPER(ARTIST_NAME) LIKE UPPER(?)" ; "generic uppercases both sides")]
#[test_case(DialectType::Postgres, "WHERE ARTIST_NAME ILIKE ?" ; "postgres uses native ilike")]
#[test_case(DialectType::MySql, "WHERE UPPER(ARTIST_NAME) LIKE UPPER(?)" ; "mysql uppercases both sides")]
#[test_case(DialectType::SqlServer, "WHERE UPPER(ARTIST_NAME) LIKE UPPER(?)" ; "sqlserver uppercases both sides")]
fn test_case_insensitive_like(dialect: DialectType, expected_where: &str) {
    let translated = engine(dialect).translate_select(&ignore_case_query()).unwrap();
    assert!(
        translated.sql.ends_with(expected_where),
        "{} does not end with {}",
        translated.sql,
        expected_where
    );
    assert_eq!(translated.bindings.len(), 1);
}

#[test]
fn test_dialect_processing_is_idempotent() {
    let catalog = catalog();
    let registry = DialectRegistry::new();
    let query = SelectQuery::new("Painting")
        .qualifier(parse_qualifier("toArtist.artistName likeIgnoreCase 'mo%' and locate('a', paintingTitle) > 0").unwrap())
        .order_by(Ordering::asc("paintingTitle"))
        .limit(10)
        .offset(5);

    for dialect_type in [
        DialectType::Generic,
        DialectType::Postgres,
        DialectType::MySql,
        DialectType::SqlServer,
    ] {
        let dialect = registry.get(&dialect_type).unwrap();
        let linked = translate_select(&catalog, &query, &TranslationOptions::default()).unwrap();
        let once = process(dialect.as_ref(), linked).unwrap();
        let twice = process(dialect.as_ref(), once.clone()).unwrap();
        assert_eq!(once, twice, "processing twice changed the tree for {}", dialect_type);
    }
}

#[test]
fn test_mysql_pagination() {
    let engine = engine(DialectType::MySql);
    let page = SelectQuery::new("Gallery").limit(10).offset(20);
    assert_eq!(
        engine.translate_select(&page).unwrap().sql,
        "SELECT GALLERY_ID, GALLERY_NAME FROM GALLERY LIMIT 10 OFFSET 20"
    );

    let offset_only = SelectQuery::new("Gallery").offset(20);
    assert_eq!(
        engine.translate_select(&offset_only).unwrap().sql,
        format!("SELECT GALLERY_ID, GALLERY_NAME FROM GALLERY LIMIT {} OFFSET 20", u64::MAX)
    );
}

#[test]
fn test_sqlserver_pagination_requires_ordering() {
    let engine = engine(DialectType::SqlServer);
    let ordered = SelectQuery::new("Gallery")
        .order_by(Ordering::asc("galleryName"))
        .limit(10)
        .offset(20);
    assert_eq!(
        engine.translate_select(&ordered).unwrap().sql,
        "SELECT GALLERY_ID, GALLERY_NAME FROM GALLERY ORDER BY GALLERY_NAME OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );

    let unordered = SelectQuery::new("Gallery").limit(10);
    assert!(matches!(
        engine.translate_select(&unordered),
        Err(EngineError::Translation(TranslationError::UnsupportedConstruct(
            UnsupportedConstructError::DialectLimitation { .. }
        )))
    ));
}

#[test]
fn test_sqlserver_function_renames() {
    let engine = engine(DialectType::SqlServer);
    let translated = engine
        .translate_qualifier("Gallery", "length(galleryName) > 3", QueryParameters::default())
        .unwrap();
    assert!(translated.sql.ends_with("WHERE LEN(GALLERY_NAME) > ?"), "{}", translated.sql);
}

#[test]
fn test_quoted_identifiers_follow_dialect() {
    let config = TranslatorConfig {
        dialect: DialectType::MySql,
        quote_identifiers: true,
        cache_enabled: false,
        ..Default::default()
    };
    let engine = Engine::new(catalog(), config).unwrap();
    let translated = engine
        .translate_qualifier("Gallery", "galleryName = 'x'", QueryParameters::default())
        .unwrap();
    assert_eq!(
        translated.sql,
        "SELECT `GALLERY_ID`, `GALLERY_NAME` FROM `GALLERY` WHERE `GALLERY_NAME` = ?"
    );

    let config = TranslatorConfig {
        dialect: DialectType::SqlServer,
        quote_identifiers: true,
        cache_enabled: false,
        ..Default::default()
    };
    let engine = Engine::new(catalog(), config).unwrap();
    let translated = engine
        .translate_qualifier("Gallery", "galleryName = 'x'", QueryParameters::default())
        .unwrap();
    assert!(translated.sql.starts_with("SELECT [GALLERY_ID], [GALLERY_NAME] FROM [GALLERY]"));
}
