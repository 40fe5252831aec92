//! MySQL / MariaDB.
//!
//! MySQL has `LOCATE` natively and one function per date part. An offset
//! without a limit still needs a `LIMIT`, so it gets the largest row count.

use super::rules::upper_like;
use super::{Dialect, DialectType, RewriteRegistry};
use crate::sql_ast::builder::function;
use crate::sql_ast::{DatePart, Node, NodeKind, PaginationNode, PaginationStyle};
use crate::translator::errors::TranslationError;

#[derive(Debug, Clone)]
pub struct MySqlDialect {
    rewrites: RewriteRegistry,
}

impl MySqlDialect {
    pub fn new() -> Self {
        Self {
            rewrites: RewriteRegistry::new()
                .register(NodeKind::Like, rewrite_like)
                .register(NodeKind::Extract, rewrite_extract),
        }
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MySqlDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::MySql
    }

    fn rewrites(&self) -> &RewriteRegistry {
        &self.rewrites
    }

    fn paginate(&self, limit: Option<u64>, offset: Option<u64>) -> PaginationNode {
        let limit = match (limit, offset) {
            (None, Some(_)) => Some(u64::MAX),
            _ => limit,
        };
        PaginationNode {
            style: PaginationStyle::LimitOffset,
            limit,
            offset,
        }
    }

    fn identifier_quotes(&self) -> (&'static str, &'static str) {
        ("`", "`")
    }
}

fn rewrite_like(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    match node {
        Node::Like(like) => Ok(upper_like(like)),
        _ => Ok(None),
    }
}

fn rewrite_extract(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    let Node::Extract(extract) = node else {
        return Ok(None);
    };
    let name = match extract.part {
        DatePart::Year => "YEAR",
        DatePart::Month => "MONTH",
        DatePart::Week => "WEEK",
        DatePart::DayOfYear => "DAYOFYEAR",
        DatePart::DayOfMonth => "DAYOFMONTH",
        DatePart::DayOfWeek => "DAYOFWEEK",
        DatePart::Hour => "HOUR",
        DatePart::Minute => "MINUTE",
        DatePart::Second => "SECOND",
    };
    Ok(Some(function(name).arg((*extract.expr).clone()).build()))
}
