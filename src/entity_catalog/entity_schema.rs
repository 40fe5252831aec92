use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use crate::sql_ast::JdbcType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub column: String,
    pub jdbc_type: JdbcType,
    pub size: Option<u32>,
    pub nullable: bool,
    pub primary_key: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>, column: impl Into<String>, jdbc_type: JdbcType) -> Self {
        Attribute {
            name: name.into(),
            column: column.into(),
            jdbc_type,
            size: None,
            nullable: true,
            primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// One source column / target column pair of a relationship join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPair {
    pub source: String,
    pub target: String,
}

impl JoinPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        JoinPair {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn flipped(&self) -> JoinPair {
        JoinPair {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub name: String,
    pub target: String,
    /// Declared joins, in declaration order. May be empty when `reverse` is set,
    /// in which case the joins are taken from the reverse relationship.
    pub joins: Vec<JoinPair>,
    pub to_many: bool,
    pub reverse: Option<String>,
}

impl Relationship {
    pub fn to_one(name: impl Into<String>, target: impl Into<String>) -> Self {
        Relationship {
            name: name.into(),
            target: target.into(),
            joins: Vec::new(),
            to_many: false,
            reverse: None,
        }
    }

    pub fn to_many(name: impl Into<String>, target: impl Into<String>) -> Self {
        Relationship {
            to_many: true,
            ..Relationship::to_one(name, target)
        }
    }

    pub fn join(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.joins.push(JoinPair::new(source, target));
        self
    }

    pub fn reverse(mut self, reverse: impl Into<String>) -> Self {
        self.reverse = Some(reverse.into());
        self
    }
}

/// A mapped table with its attributes and outgoing relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub table: String,
    pub attributes: Vec<Attribute>,
    pub relationships: Vec<Relationship>,
}

impl Entity {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Entity {
            name: name.into(),
            table: table.into(),
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_by_column(&self, column: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.column == column)
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.name == name)
    }

    /// Primary key attributes in declared attribute order.
    pub fn primary_keys(&self) -> Vec<&Attribute> {
        self.attributes.iter().filter(|a| a.primary_key).collect()
    }
}

/// Immutable set of entities, shared across translations.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_entity(&mut self, entity: Entity) -> Result<(), CatalogError> {
        if self.index.contains_key(&entity.name) {
            return Err(CatalogError::DuplicateEntity {
                entity: entity.name,
            });
        }
        self.index.insert(entity.name.clone(), self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    pub fn with_entity(mut self, entity: Entity) -> Result<Self, CatalogError> {
        self.insert_entity(entity)?;
        Ok(self)
    }

    pub fn get_entity(&self, name: &str) -> Result<&Entity, CatalogError> {
        self.get_entity_opt(name)
            .ok_or_else(|| CatalogError::UnknownEntity {
                entity: name.to_string(),
            })
    }

    pub fn get_entity_opt(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&i| &self.entities[i])
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
