//! Per-translation mutable state.
//!
//! A [`TranslationContext`] is created for exactly one translation and owns
//! the alias map, the reusable join registry and the output buffers. Content
//! that is only discovered mid-traversal (joins, DISTINCT, template sections)
//! goes into named marker buffers; typed [`Node::Marker`] placeholders mark
//! where that content belongs, and [`TranslationContext::link`] swaps each
//! placeholder for its buffer's final content once traversal is over.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use log::debug;

use super::errors::{TranslationError, TranslationStateError};
use super::query::QueryParameters;
use crate::entity_catalog::EntityCatalog;
use crate::sql_ast::{MarkerId, Node, Value};

pub const DISTINCT_MARKER: &str = "DISTINCT_MARKER";
pub const JOINS_MARKER: &str = "JOINS_MARKER";

/// Structured id-path: a case-normalized root variable plus case-sensitive
/// relationship keys. The default root is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdPath {
    root: String,
    segments: Vec<String>,
}

impl IdPath {
    pub fn root(root_var: Option<&str>) -> Self {
        IdPath {
            root: root_var.map(|r| r.to_lowercase()).unwrap_or_default(),
            segments: Vec::new(),
        }
    }

    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        IdPath {
            root: self.root.clone(),
            segments,
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for IdPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<&str> = Vec::with_capacity(self.segments.len() + 1);
        if !self.root.is_empty() {
            parts.push(&self.root);
        }
        parts.extend(self.segments.iter().map(String::as_str));
        write!(f, "{}", parts.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ActiveBuffer {
    Main,
    Marker(String),
}

pub struct TranslationContext<'a> {
    catalog: &'a EntityCatalog,
    parameters: &'a QueryParameters,
    alias_prefix: String,
    alias_counter: usize,
    aliases: HashMap<(IdPath, String), String>,
    reusable_joins: HashMap<(IdPath, String), String>,
    /// Statement kind that forbids joins, if any.
    join_free_statement: Option<&'static str>,
    joins_planned: usize,
    to_many_joins: usize,
    main: Vec<Node>,
    markers: BTreeMap<String, Vec<Node>>,
    active: ActiveBuffer,
}

impl<'a> TranslationContext<'a> {
    pub fn new(
        catalog: &'a EntityCatalog,
        parameters: &'a QueryParameters,
        alias_prefix: impl Into<String>,
    ) -> Self {
        TranslationContext {
            catalog,
            parameters,
            alias_prefix: alias_prefix.into(),
            alias_counter: 0,
            aliases: HashMap::new(),
            reusable_joins: HashMap::new(),
            join_free_statement: None,
            joins_planned: 0,
            to_many_joins: 0,
            main: Vec::new(),
            markers: BTreeMap::new(),
            active: ActiveBuffer::Main,
        }
    }

    /// Disallows joins, for statements that address a single table.
    pub fn without_joins(mut self, statement: &'static str) -> Self {
        self.join_free_statement = Some(statement);
        self
    }

    pub fn catalog(&self) -> &'a EntityCatalog {
        self.catalog
    }

    pub fn joins_allowed(&self) -> bool {
        self.join_free_statement.is_none()
    }

    /// Name of the statement kind that forbids joins, e.g. `UPDATE`.
    pub fn join_free_statement(&self) -> Option<&'static str> {
        self.join_free_statement
    }

    pub fn named_parameter(&self, name: &str) -> Result<&'a Value, TranslationError> {
        self.parameters.named.get(name).ok_or_else(|| {
            TranslationStateError::UnboundParameter {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Looks up a 1-based positional parameter.
    pub fn positional_parameter(&self, index: usize) -> Result<&'a Value, TranslationError> {
        index
            .checked_sub(1)
            .and_then(|i| self.parameters.positional.get(i))
            .ok_or_else(|| {
                TranslationStateError::PositionalParameterOutOfRange {
                    index,
                    available: self.parameters.positional.len(),
                }
                .into()
            })
    }

    // ===== Aliases and reusable joins =====

    /// Returns the alias for `table` reached via `path`, allocating the next
    /// sequential alias on first use.
    pub fn table_alias(&mut self, path: &IdPath, table: &str) -> String {
        let key = (path.clone(), table.to_string());
        if let Some(alias) = self.aliases.get(&key) {
            return alias.clone();
        }
        let alias = format!("{}{}", self.alias_prefix, self.alias_counter);
        self.alias_counter += 1;
        debug!("Allocated alias {} for {} via '{}'", alias, table, path);
        self.aliases.insert(key, alias.clone());
        alias
    }

    pub fn reusable_join(&self, source: &IdPath, relationship_key: &str) -> Option<&str> {
        self.reusable_joins
            .get(&(source.clone(), relationship_key.to_string()))
            .map(String::as_str)
    }

    pub fn register_join(
        &mut self,
        source: &IdPath,
        relationship_key: &str,
        target_alias: &str,
        to_many: bool,
    ) {
        self.reusable_joins.insert(
            (source.clone(), relationship_key.to_string()),
            target_alias.to_string(),
        );
        self.joins_planned += 1;
        if to_many {
            self.to_many_joins += 1;
        }
    }

    pub fn has_joins(&self) -> bool {
        self.joins_planned > 0
    }

    pub fn has_to_many_joins(&self) -> bool {
        self.to_many_joins > 0
    }

    // ===== Buffers and markers =====

    fn active_buffer(&mut self) -> &mut Vec<Node> {
        match &self.active {
            ActiveBuffer::Main => &mut self.main,
            ActiveBuffer::Marker(name) => self.markers.entry(name.clone()).or_default(),
        }
    }

    /// Appends to whichever buffer is currently active.
    pub fn append(&mut self, node: Node) {
        self.active_buffer().push(node);
    }

    /// Defines marker `name` if needed and writes its placeholder into the
    /// active buffer.
    pub fn mark_current_position(&mut self, name: &str) {
        self.markers.entry(name.to_string()).or_default();
        self.append(Node::Marker(MarkerId::new(name)));
    }

    /// Defines marker `name` if needed and returns a placeholder for it, for
    /// structural slots such as the select modifiers or the join list.
    pub fn marker_node(&mut self, name: &str) -> Node {
        self.markers.entry(name.to_string()).or_default();
        Node::Marker(MarkerId::new(name))
    }

    /// Redirects writes into marker `name`, optionally clearing it first.
    /// Only one buffer is active at a time; switching from one marker to
    /// another does not remember the first.
    pub fn switch_to_marker(&mut self, name: &str, reset: bool) {
        let buffer = self.markers.entry(name.to_string()).or_default();
        if reset {
            buffer.clear();
        }
        if let ActiveBuffer::Marker(current) = &self.active {
            debug!("Switching from marker {} to marker {}", current, name);
        }
        self.active = ActiveBuffer::Marker(name.to_string());
    }

    pub fn switch_to_main_buffer(&mut self) {
        self.active = ActiveBuffer::Main;
    }

    pub fn is_main_buffer_active(&self) -> bool {
        self.active == ActiveBuffer::Main
    }

    /// Writes `node` into marker `name` and restores the previously active buffer.
    pub fn emit_into_marker(&mut self, name: &str, reset: bool, node: Node) {
        let previous = self.active.clone();
        self.switch_to_marker(name, reset);
        self.append(node);
        self.active = previous;
    }

    /// Clears marker `name` without changing the active buffer.
    pub fn reset_marker(&mut self, name: &str) {
        if let Some(buffer) = self.markers.get_mut(name) {
            buffer.clear();
        }
    }

    pub fn marker_has_content(&self, name: &str) -> bool {
        self.markers
            .get(name)
            .map(|nodes| nodes.iter().any(|n| !n.is_empty_fragment()))
            .unwrap_or(false)
    }

    /// Takes the main buffer's content, leaving it empty.
    pub fn take_main_buffer(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.main)
    }

    /// Replaces every marker placeholder in `node` with a fragment holding
    /// the marker's content. Each marker may be placed at most once, and a
    /// marker with content must be placed somewhere.
    pub fn link(&self, node: Node) -> Result<Node, TranslationError> {
        let mut placed = HashSet::new();
        let linked = self.link_node(node, &mut placed)?;

        for (name, nodes) in &self.markers {
            if !placed.contains(name.as_str()) && nodes.iter().any(|n| !n.is_empty_fragment()) {
                return Err(TranslationStateError::OrphanMarker {
                    marker: name.clone(),
                }
                .into());
            }
        }
        Ok(linked)
    }

    fn link_node<'s>(
        &'s self,
        node: Node,
        placed: &mut HashSet<&'s str>,
    ) -> Result<Node, TranslationError> {
        match node {
            Node::Marker(id) => {
                let (name, content) = self.markers.get_key_value(id.name()).ok_or_else(|| {
                    TranslationStateError::UndefinedMarker {
                        marker: id.name().to_string(),
                    }
                })?;
                if !placed.insert(name.as_str()) {
                    return Err(TranslationStateError::DuplicateMarker {
                        marker: name.clone(),
                    }
                    .into());
                }
                let mut linked = Vec::with_capacity(content.len());
                for child in content {
                    linked.push(self.link_node(child.clone(), placed)?);
                }
                Ok(Node::Fragment(linked))
            }
            mut other => {
                for child in other.children_mut() {
                    let owned = std::mem::replace(child, Node::Fragment(Vec::new()));
                    *child = self.link_node(owned, placed)?;
                }
                Ok(other)
            }
        }
    }
}
