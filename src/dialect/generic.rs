//! ANSI-flavoured SQL. Used when no dialect is configured.

use super::rules::{field_extract, locate_to_position, upper_like};
use super::{Dialect, DialectType, RewriteRegistry};
use crate::sql_ast::{Node, NodeKind};
use crate::translator::errors::TranslationError;

#[derive(Debug, Clone)]
pub struct GenericDialect {
    rewrites: RewriteRegistry,
}

impl GenericDialect {
    pub fn new() -> Self {
        Self {
            rewrites: RewriteRegistry::new()
                .register(NodeKind::Like, rewrite_like)
                .register(NodeKind::Function, rewrite_function)
                .register(NodeKind::Extract, rewrite_extract),
        }
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for GenericDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::Generic
    }

    fn rewrites(&self) -> &RewriteRegistry {
        &self.rewrites
    }
}

fn rewrite_like(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    match node {
        Node::Like(like) => Ok(upper_like(like)),
        _ => Ok(None),
    }
}

fn rewrite_function(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    match node {
        Node::Function(f) if f.name == "LOCATE" => locate_to_position("generic", f).map(Some),
        _ => Ok(None),
    }
}

fn rewrite_extract(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    match node {
        Node::Extract(extract) => Ok(field_extract(extract)),
        _ => Ok(None),
    }
}
