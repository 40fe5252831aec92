//! SELECT statement assembly.
//!
//! The statement is built with placeholders for DISTINCT and the join list.
//! Both are only known once every qualifier, result column and ordering has
//! been translated, and the link pass fills them in.

use log::{debug, warn};

use super::errors::{SchemaResolutionError, TranslationError};
use super::path_resolver::join_relationship;
use super::qualifier_translator::QualifierTranslator;
use super::query::SelectQuery;
use super::translation_ctx::{IdPath, TranslationContext, DISTINCT_MARKER, JOINS_MARKER};
use crate::entity_catalog::{Entity, EntityCatalog};
use crate::sql_ast::builder::{column, exp, function, select, table, text};
use crate::sql_ast::Node;

/// Knobs the engine passes down from its configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOptions {
    pub alias_prefix: String,
    /// Add DISTINCT when a to-many join could duplicate root rows.
    pub force_distinct_on_to_many: bool,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        TranslationOptions {
            alias_prefix: "t".to_string(),
            force_distinct_on_to_many: true,
        }
    }
}

/// Translates `query` into a linked SELECT tree, ready for dialect processing.
pub fn translate_select(
    catalog: &EntityCatalog,
    query: &SelectQuery,
    options: &TranslationOptions,
) -> Result<Node, TranslationError> {
    let root = catalog.get_entity(&query.entity)?;
    let mut ctx = TranslationContext::new(catalog, &query.parameters, &options.alias_prefix);
    let root_alias = ctx.table_alias(&IdPath::root(query.root_var.as_deref()), &root.table);

    if !query.prefetches.is_empty() && (query.limit.is_some() || query.offset.is_some()) {
        warn!(
            "Query on {} combines a limit with joint prefetch; the limit applies to joined rows",
            root.name
        );
    }
    let mut prefetched = Vec::new();
    for path in &query.prefetches {
        prefetched.extend(prefetch_columns(&mut ctx, root, query.root_var.as_deref(), path)?);
    }

    let mut columns = Vec::new();
    let mut group_by = Vec::new();
    let mut has_aggregate = false;
    let mut orderings = Vec::with_capacity(query.orderings.len());
    let mut where_clause = None;
    let mut having = None;

    {
        let mut translator = QualifierTranslator::new(&mut ctx, root, query.root_var.as_deref());

        if query.columns.is_empty() {
            for attribute in &root.attributes {
                columns.push(
                    column(&attribute.column)
                        .table(&root_alias)
                        .jdbc_type(attribute.jdbc_type)
                        .build(),
                );
            }
        } else {
            for result in &query.columns {
                let node = translator.translate(&result.expr)?;
                if node.contains_aggregate() {
                    has_aggregate = true;
                } else {
                    group_by.push(node.clone());
                }
                columns.push(match &result.alias {
                    Some(alias) => exp(node).alias(alias).build(),
                    None => node,
                });
            }
        }

        if let Some(qualifier) = &query.qualifier {
            where_clause = Some(translator.translate_condition(qualifier)?);
        }
        if let Some(qualifier) = &query.having {
            having = Some(translator.translate_condition(qualifier)?);
        }

        for ordering in &query.orderings {
            let node = translator.translate(&ordering.expr)?;
            let node = if ordering.ignore_case {
                function("UPPER").arg(node).build()
            } else {
                node
            };
            orderings.push((node, ordering.descending));
        }
    }

    columns.extend(prefetched);

    let has_lob = columns.iter().any(is_lob_column);
    let forced = options.force_distinct_on_to_many && ctx.has_to_many_joins() && !has_aggregate;
    let distinct = !query.suppress_distinct && !has_lob && (query.distinct || forced);
    if distinct {
        debug!(
            "Selecting DISTINCT {} (explicit: {}, to-many joins: {})",
            root.name,
            query.distinct,
            ctx.has_to_many_joins()
        );
        ctx.emit_into_marker(DISTINCT_MARKER, true, text("DISTINCT"));
        // ORDER BY expressions must appear in a DISTINCT select list
        for (node, _) in &orderings {
            if !columns.iter().any(|c| selects(c, node)) {
                columns.push(node.clone());
            }
        }
    } else {
        ctx.reset_marker(DISTINCT_MARKER);
    }

    let mut builder = select()
        .modifier(ctx.marker_node(DISTINCT_MARKER))
        .columns(columns)
        .from(table(&root.table).alias(&root_alias))
        .join(ctx.marker_node(JOINS_MARKER));
    if let Some(condition) = where_clause {
        builder = builder.where_(condition);
    }
    if has_aggregate {
        for node in group_by {
            builder = builder.group_by(node);
        }
    }
    if let Some(condition) = having {
        builder = builder.having(condition);
    }
    for (node, descending) in orderings {
        builder = builder.order_by(node, descending);
    }
    let statement = builder.limit_offset(query.limit, query.offset).build();

    ctx.link(statement)
}

/// Outer-joins every relationship on `path` and returns the columns of the
/// entity it ends at.
fn prefetch_columns<'a>(
    ctx: &mut TranslationContext<'a>,
    root: &'a Entity,
    root_var: Option<&str>,
    path: &str,
) -> Result<Vec<Node>, TranslationError> {
    let mut id_path = IdPath::root(root_var);
    let mut alias = ctx.table_alias(&id_path, &root.table);
    let mut entity = root;

    for segment in path.split('.') {
        let Some(relationship) = entity.relationship(segment) else {
            return Err(if entity.attribute(segment).is_some() {
                SchemaResolutionError::NotARelationship {
                    entity: entity.name.clone(),
                    segment: segment.to_string(),
                }
            } else {
                SchemaResolutionError::relationship_with_context(
                    &entity.name,
                    segment,
                    format!("While resolving prefetch '{}'", path),
                )
            }
            .into());
        };
        let joined = join_relationship(ctx, entity, &id_path, &alias, relationship, true)?;
        id_path = joined.id_path;
        alias = joined.alias;
        entity = joined.entity;
    }
    debug!("Prefetching {} through '{}' as {}", entity.name, path, alias);

    Ok(entity
        .attributes
        .iter()
        .map(|attribute| {
            column(&attribute.column)
                .table(&alias)
                .jdbc_type(attribute.jdbc_type)
                .build()
        })
        .collect())
}

fn is_lob_column(node: &Node) -> bool {
    match node {
        Node::Column(c) => c.jdbc_type.is_some_and(|t| t.is_unsupported_for_distinct()),
        Node::Aliased(aliased) => is_lob_column(&aliased.expr),
        _ => false,
    }
}

/// True if select item `item` already produces `expr`.
fn selects(item: &Node, expr: &Node) -> bool {
    match item {
        Node::Aliased(aliased) => *aliased.expr == *expr,
        other => other == expr,
    }
}
