//! Top-down rewriting of a linked SQL tree for one dialect.
//!
//! Rules are keyed by [`NodeKind`] and see the parent, the node and the
//! node's index among the parent's children. A rule returns `Ok(None)` to
//! keep a node unchanged. Rules only ever produce their dialect's final form,
//! so processing an already processed tree changes nothing.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use super::Dialect;
use crate::sql_ast::{Node, NodeKind};
use crate::translator::errors::TranslationError;

pub type RewriteFn = fn(Option<&Node>, &Node, usize) -> Result<Option<Node>, TranslationError>;

#[derive(Clone, Default)]
pub struct RewriteRegistry {
    rules: HashMap<NodeKind, RewriteFn>,
}

impl RewriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rule for `kind`, replacing any earlier one.
    pub fn register(mut self, kind: NodeKind, rule: RewriteFn) -> Self {
        self.rules.insert(kind, rule);
        self
    }

    pub fn get(&self, kind: NodeKind) -> Option<RewriteFn> {
        self.rules.get(&kind).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RewriteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&NodeKind> = self.rules.keys().collect();
        kinds.sort();
        f.debug_struct("RewriteRegistry").field("kinds", &kinds).finish()
    }
}

/// Applies `dialect`'s rewrites to `root` and every node below it.
///
/// A `LIMIT`/`OFFSET` request without a dialect rule becomes the dialect's
/// pagination node.
pub fn process(dialect: &dyn Dialect, root: Node) -> Result<Node, TranslationError> {
    let mut root = root;
    if let Some(replacement) = rewrite(dialect, None, &root, 0)? {
        root = replacement;
    }
    visit(dialect, &mut root)?;
    Ok(root)
}

fn rewrite(
    dialect: &dyn Dialect,
    parent: Option<&Node>,
    node: &Node,
    index: usize,
) -> Result<Option<Node>, TranslationError> {
    let kind = node.kind();
    let replacement = match dialect.rewrites().get(kind) {
        Some(rule) => rule(parent, node, index)?,
        None => match node {
            Node::LimitOffset(request) => Some(Node::Pagination(
                dialect.paginate(request.limit, request.offset),
            )),
            _ => None,
        },
    };
    if replacement.is_some() {
        debug!("{} rewrote {:?} node at index {}", dialect.dialect_type(), kind, index);
    }
    Ok(replacement)
}

fn visit(dialect: &dyn Dialect, node: &mut Node) -> Result<(), TranslationError> {
    let mut replacements = Vec::new();
    for (index, child) in node.children().into_iter().enumerate() {
        if let Some(replacement) = rewrite(dialect, Some(&*node), child, index)? {
            replacements.push((index, replacement));
        }
    }

    if !replacements.is_empty() {
        let mut children = node.children_mut();
        for (index, replacement) in replacements {
            *children[index] = replacement;
        }
    }

    for child in node.children_mut() {
        visit(dialect, child)?;
    }
    Ok(())
}
