//! Query descriptions handed to the translator.
//!
//! These are plain data: the engine hashes their JSON form for the
//! translation cache, so every type here derives `Serialize`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::qualifier_parser::Expression;
use crate::sql_ast::Value;

/// Values for named (`$name`, `:name`) and positional (`?1`) parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParameters {
    #[serde(default)]
    pub named: BTreeMap<String, Value>,
    #[serde(default)]
    pub positional: Vec<Value>,
}

impl QueryParameters {
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn with_positional(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }
}

/// One explicitly selected expression, optionally aliased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub expr: Expression,
    pub alias: Option<String>,
}

impl ResultColumn {
    pub fn new(expr: Expression) -> Self {
        ResultColumn { expr, alias: None }
    }

    pub fn aliased(expr: Expression, alias: impl Into<String>) -> Self {
        ResultColumn {
            expr,
            alias: Some(alias.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub expr: Expression,
    pub descending: bool,
    /// Compare case-insensitively by ordering on `UPPER(expr)`.
    pub ignore_case: bool,
}

impl Ordering {
    pub fn asc(path: &str) -> Self {
        Ordering {
            expr: Expression::path(path),
            descending: false,
            ignore_case: false,
        }
    }

    pub fn desc(path: &str) -> Self {
        Ordering {
            expr: Expression::path(path),
            descending: true,
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    pub entity: String,
    /// Optional root variable paths may start with, e.g. `a` in `a.artistName`.
    pub root_var: Option<String>,
    pub qualifier: Option<Expression>,
    /// Explicit result columns; empty means every attribute of the root entity.
    pub columns: Vec<ResultColumn>,
    pub having: Option<Expression>,
    pub orderings: Vec<Ordering>,
    pub distinct: bool,
    pub suppress_distinct: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Relationship paths fetched in the same statement through outer joins.
    #[serde(default)]
    pub prefetches: Vec<String>,
    pub parameters: QueryParameters,
}

impl SelectQuery {
    pub fn new(entity: impl Into<String>) -> Self {
        SelectQuery {
            entity: entity.into(),
            root_var: None,
            qualifier: None,
            columns: Vec::new(),
            having: None,
            orderings: Vec::new(),
            distinct: false,
            suppress_distinct: false,
            limit: None,
            offset: None,
            prefetches: Vec::new(),
            parameters: QueryParameters::default(),
        }
    }

    pub fn root_var(mut self, root_var: impl Into<String>) -> Self {
        self.root_var = Some(root_var.into());
        self
    }

    pub fn qualifier(mut self, qualifier: Expression) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn column(mut self, column: ResultColumn) -> Self {
        self.columns.push(column);
        self
    }

    pub fn having(mut self, having: Expression) -> Self {
        self.having = Some(having);
        self
    }

    pub fn order_by(mut self, ordering: Ordering) -> Self {
        self.orderings.push(ordering);
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn suppress_distinct(mut self, suppress: bool) -> Self {
        self.suppress_distinct = suppress;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Joint prefetch of a dotted relationship path, e.g. `toArtist.toGallery`.
    pub fn prefetch(mut self, path: impl Into<String>) -> Self {
        self.prefetches.push(path.into());
        self
    }

    pub fn parameters(mut self, parameters: QueryParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Values are keyed by property name. A to-one relationship name takes an
/// object id and expands into its foreign key columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertQuery {
    pub entity: String,
    pub values: Vec<(String, Value)>,
}

impl InsertQuery {
    pub fn new(entity: impl Into<String>) -> Self {
        InsertQuery {
            entity: entity.into(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((property.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateQuery {
    pub entity: String,
    pub values: Vec<(String, Value)>,
    pub qualifier: Option<Expression>,
    pub parameters: QueryParameters,
}

impl UpdateQuery {
    pub fn new(entity: impl Into<String>) -> Self {
        UpdateQuery {
            entity: entity.into(),
            values: Vec::new(),
            qualifier: None,
            parameters: QueryParameters::default(),
        }
    }

    pub fn set(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((property.into(), value.into()));
        self
    }

    pub fn qualifier(mut self, qualifier: Expression) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn parameters(mut self, parameters: QueryParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteQuery {
    pub entity: String,
    pub qualifier: Option<Expression>,
    pub parameters: QueryParameters,
}

impl DeleteQuery {
    pub fn new(entity: impl Into<String>) -> Self {
        DeleteQuery {
            entity: entity.into(),
            qualifier: None,
            parameters: QueryParameters::default(),
        }
    }

    pub fn qualifier(mut self, qualifier: Expression) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn parameters(mut self, parameters: QueryParameters) -> Self {
        self.parameters = parameters;
        self
    }
}
