//! Parameter bindings.
//!
//! The renderer hands every value node to a [`ParameterBinder`] at the moment
//! it writes the `?` placeholder, so the binding list always lines up with
//! the placeholders in the SQL text.

use serde::{Deserialize, Serialize};

use crate::sql_ast::builder::{combine, exp};
use crate::sql_ast::{JdbcType, Node, Operator, Value, ValueNode};
use crate::translator::errors::{TranslationError, UnsupportedConstructError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub value: Value,
    pub jdbc_type: JdbcType,
    /// Bound as one element of an IN list.
    pub is_array: bool,
}

/// Final output of a translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedQuery {
    pub sql: String,
    pub bindings: Vec<Binding>,
}

impl TranslatedQuery {
    pub fn binding_values(&self) -> Vec<&Value> {
        self.bindings.iter().map(|b| &b.value).collect()
    }
}

#[derive(Debug, Default)]
pub struct ParameterBinder {
    bindings: Vec<Binding>,
}

impl ParameterBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a binding and returns the placeholder to write.
    pub fn bind(&mut self, node: &ValueNode) -> &'static str {
        self.bindings.push(Binding {
            value: node.value.clone(),
            jdbc_type: node.jdbc_type,
            is_array: node.is_array,
        });
        "?"
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn finish(self, sql: String) -> TranslatedQuery {
        TranslatedQuery {
            sql,
            bindings: self.bindings,
        }
    }
}

/// Compares a multi-column key column by column.
///
/// `=` becomes an AND of equalities and `<>` an OR of inequalities, one per
/// `(column, value)` pair in the order given.
pub fn expand_key_comparison(op: Operator, pairs: Vec<(Node, Node)>) -> Result<Node, TranslationError> {
    let connective = match op {
        Operator::Eq => Operator::And,
        Operator::NotEq => Operator::Or,
        _ if pairs.len() == 1 => Operator::And,
        other => {
            return Err(UnsupportedConstructError::ValueShape {
                shape: "compound key".to_string(),
                reason: format!("operator '{}' cannot compare compound keys", other.symbol()),
            }
            .into())
        }
    };

    let comparisons: Vec<Node> = pairs
        .into_iter()
        .map(|(column, value)| exp(column).op(op, value).build())
        .collect();

    combine(connective, comparisons).ok_or_else(|| {
        UnsupportedConstructError::ValueShape {
            shape: "compound key".to_string(),
            reason: "no key columns to compare".to_string(),
        }
        .into()
    })
}
