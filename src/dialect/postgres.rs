//! PostgreSQL.
//!
//! Case-insensitive matching uses native `ILIKE`. Date parts without a
//! standard `EXTRACT` keyword map onto Postgres fields.

use super::rules::{field_extract, locate_to_position, native_ilike};
use super::{Dialect, DialectType, RewriteRegistry};
use crate::sql_ast::{Node, NodeKind};
use crate::translator::errors::TranslationError;

#[derive(Debug, Clone)]
pub struct PostgresDialect {
    rewrites: RewriteRegistry,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self {
            rewrites: RewriteRegistry::new()
                .register(NodeKind::Like, rewrite_like)
                .register(NodeKind::Function, rewrite_function)
                .register(NodeKind::Extract, rewrite_extract),
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Postgres
    }

    fn rewrites(&self) -> &RewriteRegistry {
        &self.rewrites
    }
}

fn rewrite_like(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    match node {
        Node::Like(like) => Ok(native_ilike(like)),
        _ => Ok(None),
    }
}

fn rewrite_function(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    match node {
        Node::Function(f) if f.name == "LOCATE" => locate_to_position("postgres", f).map(Some),
        _ => Ok(None),
    }
}

fn rewrite_extract(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    match node {
        Node::Extract(extract) => Ok(field_extract(extract)),
        _ => Ok(None),
    }
}
