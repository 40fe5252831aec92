//! INSERT, UPDATE and DELETE statements.
//!
//! Modification statements address one table without aliases, so their
//! qualifiers may only use the root table's own columns. A to-one
//! relationship compared with an object id needs no join and stays legal.

use super::errors::{JoinPlanningError, SchemaResolutionError, TranslationError};
use super::path_resolver::relationship_joins;
use super::qualifier_translator::{bind_value, QualifierTranslator};
use super::query::{DeleteQuery, InsertQuery, UpdateQuery};
use super::translation_ctx::{IdPath, TranslationContext};
use crate::entity_catalog::{Entity, EntityCatalog};
use crate::sql_ast::builder::{column, delete, insert, table, update};
use crate::sql_ast::{Node, Value};

pub fn translate_insert(catalog: &EntityCatalog, query: &InsertQuery) -> Result<Node, TranslationError> {
    let entity = catalog.get_entity(&query.entity)?;
    let mut builder = insert(table(&entity.table));
    for (property, v) in &query.values {
        for (column, value) in property_assignments(catalog, entity, property, v)? {
            builder = builder.value(column, value);
        }
    }
    Ok(builder.build())
}

pub fn translate_update(
    catalog: &EntityCatalog,
    query: &UpdateQuery,
    alias_prefix: &str,
) -> Result<Node, TranslationError> {
    let entity = catalog.get_entity(&query.entity)?;
    let mut ctx = TranslationContext::new(catalog, &query.parameters, alias_prefix).without_joins("UPDATE");
    ctx.table_alias(&IdPath::root(None), &entity.table);

    let mut builder = update(table(&entity.table));
    for (property, v) in &query.values {
        for (column, value) in property_assignments(catalog, entity, property, v)? {
            builder = builder.set(column, value);
        }
    }
    if let Some(qualifier) = &query.qualifier {
        let condition = QualifierTranslator::new(&mut ctx, entity, None).translate_condition(qualifier)?;
        builder = builder.where_(condition);
    }
    ctx.link(builder.build())
}

pub fn translate_delete(
    catalog: &EntityCatalog,
    query: &DeleteQuery,
    alias_prefix: &str,
) -> Result<Node, TranslationError> {
    let entity = catalog.get_entity(&query.entity)?;
    let mut ctx = TranslationContext::new(catalog, &query.parameters, alias_prefix).without_joins("DELETE");
    ctx.table_alias(&IdPath::root(None), &entity.table);

    let mut builder = delete(table(&entity.table));
    if let Some(qualifier) = &query.qualifier {
        let condition = QualifierTranslator::new(&mut ctx, entity, None).translate_condition(qualifier)?;
        builder = builder.where_(condition);
    }
    ctx.link(builder.build())
}

/// Column/value pairs for one property. An attribute maps to its column; a
/// to-one relationship maps an object id (or null) onto its foreign keys.
fn property_assignments(
    catalog: &EntityCatalog,
    entity: &Entity,
    property: &str,
    v: &Value,
) -> Result<Vec<(Node, Node)>, TranslationError> {
    if let Some(attribute) = entity.attribute(property) {
        return Ok(vec![(
            column(&attribute.column).jdbc_type(attribute.jdbc_type).build(),
            bind_value(v.clone(), Some(attribute.jdbc_type))?,
        )]);
    }

    let relationship = entity
        .relationship(property)
        .filter(|r| !r.to_many)
        .ok_or_else(|| {
            SchemaResolutionError::attribute_with_context(
                &entity.name,
                property,
                "Only attributes and to-one relationships can be assigned",
            )
        })?;

    let target = catalog.get_entity(&relationship.target)?;
    let joins = relationship_joins(catalog, entity, relationship)?;
    let target_keys = target.primary_keys();
    // Only a foreign key held by this table can be assigned
    if joins.len() != target_keys.len()
        || !joins.iter().all(|p| target_keys.iter().any(|k| k.column == p.target))
    {
        return Err(JoinPlanningError::KeyCountMismatch {
            entity: entity.name.clone(),
            relationship: relationship.name.clone(),
            target: target.name.clone(),
            joins: joins.len(),
            keys: target_keys.len(),
        }
        .into());
    }

    let mut assignments = Vec::new();
    for pair in joins {
        let jdbc_type = target
            .attribute_by_column(&pair.target)
            .map(|a| a.jdbc_type)
            .or_else(|| entity.attribute_by_column(&pair.source).map(|a| a.jdbc_type));
        let key_value = match v {
            Value::Null => Value::Null,
            Value::ObjectId(id) => id.value_for(&pair.target).cloned().ok_or_else(|| {
                JoinPlanningError::IncompleteObjectId {
                    entity: id.entity.clone(),
                    column: pair.target.clone(),
                }
            })?,
            scalar => scalar.clone(),
        };
        let mut builder = column(&pair.source);
        if let Some(jdbc_type) = jdbc_type {
            builder = builder.jdbc_type(jdbc_type);
        }
        assignments.push((builder.build(), bind_value(key_value, jdbc_type)?));
    }
    Ok(assignments)
}
