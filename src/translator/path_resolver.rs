//! Resolves dotted paths against the entity catalog.
//!
//! Each relationship segment becomes a join keyed by `(source id-path,
//! relationship key)`. Repeating the same key reuses the registered alias;
//! a different id-path to the same table gets a fresh one. Joins are written
//! into the joins marker, so the select statement only needs a placeholder.

use log::debug;

use super::errors::{JoinPlanningError, SchemaResolutionError, TranslationError};
use super::translation_ctx::{IdPath, TranslationContext, JOINS_MARKER};
use crate::entity_catalog::{Attribute, Entity, EntityCatalog, JoinPair, Relationship};
use crate::qualifier_parser::{PathExpression, PathKind, PathSegment};
use crate::sql_ast::builder::{column, exp, join, table};
use crate::sql_ast::JoinKind;

/// What the final segment of a path names.
#[derive(Debug, Clone, Copy)]
pub enum PathTarget<'a> {
    Attribute(&'a Attribute),
    /// A relationship in terminal position, left unjoined so the caller can
    /// compare foreign keys directly.
    Relationship(&'a Relationship),
}

#[derive(Debug, Clone)]
pub struct ResolvedPath<'a> {
    /// Alias of the table that owns the final segment.
    pub alias: String,
    pub entity: &'a Entity,
    pub id_path: IdPath,
    pub target: PathTarget<'a>,
    /// Outer-join flag written on the final segment (`toArtist+`).
    pub outer: bool,
}

/// Walks `path` from `root`, planning a join for every relationship segment
/// except a terminal one.
pub fn resolve<'a>(
    ctx: &mut TranslationContext<'a>,
    root: &'a Entity,
    root_var: Option<&str>,
    path: &PathExpression,
) -> Result<ResolvedPath<'a>, TranslationError> {
    let segments = strip_root_variable(root, root_var, path)?;
    let Some((last, intermediate)) = segments.split_last() else {
        return Err(SchemaResolutionError::UnknownAttribute {
            entity: root.name.clone(),
            attribute: path.to_string(),
        }
        .into());
    };

    let mut id_path = IdPath::root(root_var);
    let mut alias = ctx.table_alias(&id_path, &root.table);
    let mut entity = root;

    for segment in intermediate {
        let Some(relationship) = entity.relationship(&segment.name) else {
            return Err(if entity.attribute(&segment.name).is_some() {
                SchemaResolutionError::NotARelationship {
                    entity: entity.name.clone(),
                    segment: segment.name.clone(),
                }
            } else {
                SchemaResolutionError::relationship_with_context(
                    &entity.name,
                    &segment.name,
                    format!("While resolving path '{}'", path),
                )
            }
            .into());
        };
        let joined = join_relationship(ctx, entity, &id_path, &alias, relationship, segment.outer)?;
        id_path = joined.id_path;
        alias = joined.alias;
        entity = joined.entity;
    }

    let target = match path.kind {
        PathKind::Db => entity
            .attribute_by_column(&last.name)
            .map(PathTarget::Attribute)
            .ok_or_else(|| SchemaResolutionError::UnknownColumn {
                entity: entity.name.clone(),
                column: last.name.clone(),
            })?,
        PathKind::Object => {
            if let Some(attribute) = entity.attribute(&last.name) {
                PathTarget::Attribute(attribute)
            } else if let Some(relationship) = entity.relationship(&last.name) {
                PathTarget::Relationship(relationship)
            } else {
                return Err(SchemaResolutionError::attribute_with_context(
                    &entity.name,
                    &last.name,
                    format!("While resolving path '{}'", path),
                )
                .into());
            }
        }
    };

    Ok(ResolvedPath {
        alias,
        entity,
        id_path,
        target,
        outer: last.outer,
    })
}

/// Drops a leading root variable. An explicit root variable that differs
/// from the query's is an error.
fn strip_root_variable<'p>(
    root: &Entity,
    root_var: Option<&str>,
    path: &'p PathExpression,
) -> Result<&'p [PathSegment], TranslationError> {
    if let Some(explicit) = &path.root_var {
        let matches = root_var.is_some_and(|rv| rv.eq_ignore_ascii_case(explicit));
        if !matches {
            return Err(SchemaResolutionError::attribute_with_context(
                &root.name,
                path.to_string(),
                format!("Unknown root variable '{}'", explicit),
            )
            .into());
        }
        return Ok(&path.segments);
    }

    match (root_var, path.segments.split_first()) {
        (Some(rv), Some((first, rest))) if !rest.is_empty() && first.name.eq_ignore_ascii_case(rv) => {
            Ok(rest)
        }
        _ => Ok(&path.segments),
    }
}

#[derive(Debug, Clone)]
pub struct JoinedTable<'a> {
    pub id_path: IdPath,
    pub alias: String,
    pub entity: &'a Entity,
}

/// Joins `relationship` from the table at `source_path`, reusing an
/// identical earlier join.
pub fn join_relationship<'a>(
    ctx: &mut TranslationContext<'a>,
    source: &'a Entity,
    source_path: &IdPath,
    source_alias: &str,
    relationship: &'a Relationship,
    outer: bool,
) -> Result<JoinedTable<'a>, TranslationError> {
    let target = ctx.catalog().get_entity(&relationship.target)?;
    let key = if outer {
        format!("{}+", relationship.name)
    } else {
        relationship.name.clone()
    };
    let id_path = source_path.child(&key);

    if let Some(alias) = ctx.reusable_join(source_path, &key) {
        debug!("Reusing join {} for '{}'", alias, id_path);
        return Ok(JoinedTable {
            alias: alias.to_string(),
            id_path,
            entity: target,
        });
    }

    if let Some(statement) = ctx.join_free_statement() {
        return Err(JoinPlanningError::JoinNotAllowed {
            path: id_path.to_string(),
            statement: statement.to_string(),
        }
        .into());
    }

    let pairs = relationship_joins(ctx.catalog(), source, relationship)?;
    let alias = ctx.table_alias(&id_path, &target.table);
    let kind = if outer { JoinKind::Left } else { JoinKind::Inner };

    let mut builder = join(kind, table(&target.table).alias(&alias));
    for pair in &pairs {
        builder = builder.on(
            exp(column(&pair.source).table(source_alias)).eq(column(&pair.target).table(&alias)),
        );
    }
    ctx.emit_into_marker(JOINS_MARKER, false, builder.build());
    ctx.register_join(source_path, &key, &alias, relationship.to_many);

    Ok(JoinedTable {
        id_path,
        alias,
        entity: target,
    })
}

/// Join column pairs of `relationship`, deriving them from the reverse
/// relationship when none are declared.
pub fn relationship_joins(
    catalog: &EntityCatalog,
    source: &Entity,
    relationship: &Relationship,
) -> Result<Vec<JoinPair>, TranslationError> {
    if !relationship.joins.is_empty() {
        return Ok(relationship.joins.clone());
    }

    let Some(reverse_name) = &relationship.reverse else {
        return Err(JoinPlanningError::EmptyJoin {
            entity: source.name.clone(),
            relationship: relationship.name.clone(),
        }
        .into());
    };

    let target = catalog.get_entity(&relationship.target)?;
    match target.relationship(reverse_name) {
        Some(reverse) if !reverse.joins.is_empty() => {
            Ok(reverse.joins.iter().map(JoinPair::flipped).collect())
        }
        Some(_) => Err(JoinPlanningError::EmptyJoin {
            entity: source.name.clone(),
            relationship: relationship.name.clone(),
        }
        .into()),
        None => Err(JoinPlanningError::missing_reverse_with_context(
            &source.name,
            &relationship.name,
            reverse_name,
            format!("Entity '{}' declares no such relationship", target.name),
        )
        .into()),
    }
}
