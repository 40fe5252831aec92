use relsql::entity_catalog::{load_catalog, CatalogError, EntityCatalogConfig};
use relsql::sql_ast::JdbcType;
use std::io::Write;

use super::common::{catalog, TESTMAP};

#[test]
fn test_fixture_loads_every_entity() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 10);

    let artist = catalog.get_entity("Artist").unwrap();
    assert_eq!(artist.table, "ARTIST");
    assert_eq!(artist.attributes.len(), 3);
    assert_eq!(artist.attributes[1].jdbc_type, JdbcType::Char);

    let fk = catalog.get_entity("CompoundFk").unwrap();
    let to_pk = fk.relationships.iter().find(|r| r.name == "toCompoundPk").unwrap();
    assert_eq!(to_pk.joins.len(), 2);
    assert!(!to_pk.to_many);
}

#[test]
fn test_load_catalog_from_path() {
    assert!(load_catalog(TESTMAP).is_ok());
    assert!(load_catalog("/nonexistent/testmap.yaml").is_err());
}

#[test]
fn test_unknown_relationship_target_is_rejected() {
    let yaml = r#"
entities:
  - name: Painting
    table: PAINTING
    attributes:
      - { name: paintingId, column: PAINTING_ID, type: INTEGER, primary_key: true }
    relationships:
      - name: toArtist
        target: Artist
        joins: [{ source: PAINTING_ID, target: ARTIST_ID }]
"#;
    let err = EntityCatalogConfig::from_yaml_str(yaml)
        .and_then(|config| config.to_catalog())
        .unwrap_err();
    assert!(
        err.to_string().contains("Artist"),
        "error should name the missing target: {}",
        err
    );
}

#[test]
fn test_unknown_jdbc_type_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "entities:\n  - name: A\n    table: A\n    attributes:\n      - {{ name: id, type: NOT_A_TYPE }}"
    )
    .unwrap();
    assert!(load_catalog(file.path()).is_err());
}

#[test]
fn test_missing_entity_lookup() {
    let catalog = catalog();
    assert!(matches!(
        catalog.get_entity("Sculpture"),
        Err(CatalogError::UnknownEntity { ref entity }) if entity == "Sculpture"
    ));
}
