/// Entity catalog configuration loading.
///
/// Loads entity definitions from YAML, validates their structure and turns
/// them into an immutable [`EntityCatalog`]:
///
/// ```yaml
/// entities:
///   - name: Painting
///     table: PAINTING
///     attributes:
///       - { name: paintingId, column: PAINTING_ID, type: INTEGER, primary_key: true }
///       - { name: paintingTitle, column: PAINTING_TITLE, type: VARCHAR, size: 255 }
///     relationships:
///       - name: toArtist
///         target: Artist
///         joins: [{ source: ARTIST_ID, target: ARTIST_ID }]
/// ```
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::entity_schema::{Attribute, Entity, EntityCatalog, JoinPair, Relationship};
use super::errors::CatalogError;
use crate::sql_ast::JdbcType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCatalogConfig {
    pub entities: Vec<EntityDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    pub table: String,
    pub attributes: Vec<AttributeDefinition>,
    #[serde(default)]
    pub relationships: Vec<RelationshipDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    /// Defaults to the attribute name
    #[serde(default)]
    pub column: Option<String>,
    #[serde(rename = "type")]
    pub jdbc_type: JdbcType,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDefinition {
    pub name: String,
    pub target: String,
    #[serde(default)]
    pub joins: Vec<JoinDefinition>,
    #[serde(default)]
    pub to_many: bool,
    #[serde(default)]
    pub reverse: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinDefinition {
    pub source: String,
    pub target: String,
}

impl AttributeDefinition {
    fn column_name(&self) -> &str {
        self.column.as_deref().unwrap_or(&self.name)
    }
}

impl EntityDefinition {
    fn has_column(&self, column: &str) -> bool {
        self.attributes.iter().any(|a| a.column_name() == column)
    }
}

impl EntityCatalogConfig {
    /// Load catalog configuration from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| CatalogError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse catalog configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Structural validation: names are unique, relationship targets exist
    /// and join columns are declared on both sides.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.entities.is_empty() {
            return Err(CatalogError::InvalidConfig {
                message: "Catalog must contain at least one entity definition".to_string(),
            });
        }

        let mut seen_entities = HashSet::new();
        for entity in &self.entities {
            if !seen_entities.insert(entity.name.as_str()) {
                return Err(CatalogError::DuplicateEntity {
                    entity: entity.name.clone(),
                });
            }
        }

        for entity in &self.entities {
            self.validate_entity(entity)?;
        }

        Ok(())
    }

    fn validate_entity(&self, entity: &EntityDefinition) -> Result<(), CatalogError> {
        if entity.table.trim().is_empty() {
            return Err(CatalogError::invalid_with_context(&entity.name, "empty table name"));
        }

        let mut seen_attributes = HashSet::new();
        for attribute in &entity.attributes {
            if !seen_attributes.insert(attribute.name.as_str()) {
                return Err(CatalogError::invalid_with_context(
                    &entity.name,
                    format!("duplicate attribute '{}'", attribute.name),
                ));
            }
        }

        let mut seen_relationships = HashSet::new();
        for relationship in &entity.relationships {
            if !seen_relationships.insert(relationship.name.as_str())
                || seen_attributes.contains(relationship.name.as_str())
            {
                return Err(CatalogError::invalid_with_context(
                    &entity.name,
                    format!("duplicate property '{}'", relationship.name),
                ));
            }

            let target = self
                .entities
                .iter()
                .find(|e| e.name == relationship.target)
                .ok_or_else(|| {
                    CatalogError::invalid_with_context(
                        &entity.name,
                        format!(
                            "relationship '{}' targets unknown entity '{}'",
                            relationship.name, relationship.target
                        ),
                    )
                })?;

            if relationship.joins.is_empty() && relationship.reverse.is_none() {
                return Err(CatalogError::invalid_with_context(
                    &entity.name,
                    format!(
                        "relationship '{}' declares neither joins nor a reverse relationship",
                        relationship.name
                    ),
                ));
            }

            for join in &relationship.joins {
                if !entity.has_column(&join.source) {
                    return Err(CatalogError::invalid_with_context(
                        &entity.name,
                        format!(
                            "relationship '{}' joins from undeclared column '{}'",
                            relationship.name, join.source
                        ),
                    ));
                }
                if !target.has_column(&join.target) {
                    return Err(CatalogError::invalid_with_context(
                        &entity.name,
                        format!(
                            "relationship '{}' joins to undeclared column '{}.{}'",
                            relationship.name, target.name, join.target
                        ),
                    ));
                }
            }

            if let Some(reverse) = &relationship.reverse {
                if !target.relationships.iter().any(|r| &r.name == reverse) {
                    return Err(CatalogError::invalid_with_context(
                        &entity.name,
                        format!(
                            "relationship '{}' names missing reverse '{}.{}'",
                            relationship.name, target.name, reverse
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Validate and build the immutable catalog
    pub fn to_catalog(&self) -> Result<EntityCatalog, CatalogError> {
        self.validate()?;

        let mut catalog = EntityCatalog::new();
        for definition in &self.entities {
            let mut entity = Entity::new(&definition.name, &definition.table);
            for attr in &definition.attributes {
                entity.attributes.push(Attribute {
                    name: attr.name.clone(),
                    column: attr.column_name().to_string(),
                    jdbc_type: attr.jdbc_type,
                    size: attr.size,
                    nullable: attr.nullable && !attr.primary_key,
                    primary_key: attr.primary_key,
                });
            }
            for rel in &definition.relationships {
                entity.relationships.push(Relationship {
                    name: rel.name.clone(),
                    target: rel.target.clone(),
                    joins: rel
                        .joins
                        .iter()
                        .map(|j| JoinPair::new(&j.source, &j.target))
                        .collect(),
                    to_many: rel.to_many,
                    reverse: rel.reverse.clone(),
                });
            }
            catalog.insert_entity(entity)?;
        }

        log::info!("Loaded entity catalog with {} entities", catalog.len());
        Ok(catalog)
    }
}

/// Loads, validates and builds a catalog from a YAML file in one step.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<EntityCatalog, CatalogError> {
    EntityCatalogConfig::from_yaml_file(path)?.to_catalog()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
entities:
  - name: Artist
    table: ARTIST
    attributes:
      - { name: artistId, column: ARTIST_ID, type: BIGINT, primary_key: true }
      - { name: artistName, column: ARTIST_NAME, type: CHAR, size: 254, nullable: false }
    relationships:
      - { name: paintingArray, target: Painting, to_many: true, reverse: toArtist }
  - name: Painting
    table: PAINTING
    attributes:
      - { name: paintingId, column: PAINTING_ID, type: INTEGER, primary_key: true }
      - { name: ARTIST_ID, type: BIGINT }
    relationships:
      - name: toArtist
        target: Artist
        joins: [{ source: ARTIST_ID, target: ARTIST_ID }]
"#;

    #[test]
    fn test_from_yaml_str_builds_catalog() {
        let catalog = EntityCatalogConfig::from_yaml_str(MINIMAL)
            .unwrap()
            .to_catalog()
            .unwrap();
        let artist = catalog.get_entity("Artist").unwrap();
        assert_eq!(artist.table, "ARTIST");
        assert_eq!(artist.attribute("artistName").unwrap().size, Some(254));
        assert!(!artist.attribute("artistName").unwrap().nullable);
        assert!(artist.relationship("paintingArray").unwrap().to_many);

        let painting = catalog.get_entity("Painting").unwrap();
        assert_eq!(painting.attribute("ARTIST_ID").unwrap().column, "ARTIST_ID");
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = EntityCatalogConfig::from_yaml_file("/nonexistent/catalog.yaml").unwrap_err();
        assert!(matches!(err, CatalogError::ConfigReadError { .. }));
    }

    #[test]
    fn test_unknown_target_rejected() {
        let yaml = MINIMAL.replace("target: Painting", "target: Sculpture");
        let err = EntityCatalogConfig::from_yaml_str(&yaml)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("unknown entity 'Sculpture'"));
    }

    #[test]
    fn test_undeclared_join_column_rejected() {
        let yaml = MINIMAL.replace("{ source: ARTIST_ID, target: ARTIST_ID }", "{ source: ARTIST_FK, target: ARTIST_ID }");
        let err = EntityCatalogConfig::from_yaml_str(&yaml)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("ARTIST_FK"));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let yaml = MINIMAL.replace("name: ARTIST_ID, type: BIGINT", "name: paintingId, type: BIGINT");
        let err = EntityCatalogConfig::from_yaml_str(&yaml)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate attribute"));
    }

    #[test]
    fn test_missing_reverse_rejected() {
        let yaml = MINIMAL.replace("reverse: toArtist", "reverse: artist");
        let err = EntityCatalogConfig::from_yaml_str(&yaml)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("missing reverse"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = EntityCatalogConfig::from_yaml_str("entities: [").unwrap_err();
        assert!(matches!(err, CatalogError::ConfigParseError { .. }));
    }
}
