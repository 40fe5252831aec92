//! Microsoft SQL Server.
//!
//! Pagination is `OFFSET .. FETCH`, which SQL Server only accepts after an
//! `ORDER BY`. String and date functions use the T-SQL names.

use super::rules::{cast, offset_fetch, rename_function, upper_like};
use super::{Dialect, DialectType, RewriteRegistry};
use crate::sql_ast::builder::{function, text};
use crate::sql_ast::{
    DatePart, Node, NodeKind, Operator, OperatorNode, PaginationNode,
};
use crate::translator::errors::{TranslationError, UnsupportedConstructError};

#[derive(Debug, Clone)]
pub struct SqlServerDialect {
    rewrites: RewriteRegistry,
}

impl SqlServerDialect {
    pub fn new() -> Self {
        Self {
            rewrites: RewriteRegistry::new()
                .register(NodeKind::Like, rewrite_like)
                .register(NodeKind::Function, rewrite_function)
                .register(NodeKind::Extract, rewrite_extract)
                .register(NodeKind::LimitOffset, rewrite_limit_offset),
        }
    }
}

impl Default for SqlServerDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqlServerDialect {
    fn dialect_type(&self) -> DialectType {
        DialectType::SqlServer
    }

    fn rewrites(&self) -> &RewriteRegistry {
        &self.rewrites
    }

    fn paginate(&self, limit: Option<u64>, offset: Option<u64>) -> PaginationNode {
        offset_fetch(limit, offset)
    }

    fn identifier_quotes(&self) -> (&'static str, &'static str) {
        ("[", "]")
    }
}

fn rewrite_like(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    match node {
        Node::Like(like) => Ok(upper_like(like)),
        _ => Ok(None),
    }
}

fn rewrite_function(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    let Node::Function(f) = node else {
        return Ok(None);
    };
    let rewritten = match f.name.as_str() {
        // same argument order, optional start position included
        "LOCATE" => rename_function(f, "CHARINDEX"),
        "LENGTH" => rename_function(f, "LEN"),
        "MOD" => Node::Operator(OperatorNode {
            op: Operator::Mod,
            children: f.args.clone(),
        }),
        "CURRENT_DATE" => cast(function("GETDATE").build(), "DATE"),
        "CURRENT_TIME" => cast(function("GETDATE").build(), "TIME"),
        _ => return Ok(None),
    };
    Ok(Some(rewritten))
}

fn rewrite_extract(_parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    let Node::Extract(extract) = node else {
        return Ok(None);
    };
    let part = match extract.part {
        DatePart::Year => "YEAR",
        DatePart::Month => "MONTH",
        DatePart::Week => "WEEK",
        DatePart::DayOfYear => "DAYOFYEAR",
        DatePart::DayOfMonth => "DAY",
        DatePart::DayOfWeek => "WEEKDAY",
        DatePart::Hour => "HOUR",
        DatePart::Minute => "MINUTE",
        DatePart::Second => "SECOND",
    };
    Ok(Some(
        function("DATEPART")
            .arg(text(part))
            .arg((*extract.expr).clone())
            .build(),
    ))
}

fn rewrite_limit_offset(parent: Option<&Node>, node: &Node, _index: usize) -> Result<Option<Node>, TranslationError> {
    let Node::LimitOffset(request) = node else {
        return Ok(None);
    };
    match parent {
        Some(Node::Select(select)) if select.order_by.is_some() => {
            Ok(Some(Node::Pagination(offset_fetch(request.limit, request.offset))))
        }
        _ => Err(UnsupportedConstructError::DialectLimitation {
            dialect: "sqlserver".to_string(),
            construct: "OFFSET/FETCH pagination without ORDER BY".to_string(),
        }
        .into()),
    }
}
