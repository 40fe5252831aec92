//! SQL text rendering.
//!
//! A depth-first walk over a processed tree. Every value node becomes a `?`
//! placeholder and a binding, in placeholder order. Parentheses come from
//! the precedence table only, so identical trees render to identical text.
//!
//! Columns and tables are qualified with their aliases only inside a SELECT
//! that has joins, unless [`TableAliasPolicy::Always`] is set. INSERT,
//! UPDATE and DELETE never use aliases.

use serde::{Deserialize, Serialize};

use super::binder::{ParameterBinder, TranslatedQuery};
use super::precedence::needs_parens;
use crate::dialect::QuotingStrategy;
use crate::sql_ast::{ArgStyle, Node, PaginationNode, PaginationStyle, SelectNode, Value};
use crate::translator::errors::{TranslationError, TranslationStateError, UnsupportedConstructError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableAliasPolicy {
    /// Qualify columns only when the statement joins other tables
    #[default]
    WhenJoined,
    Always,
}

impl std::str::FromStr for TableAliasPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "when_joined" | "whenjoined" => Ok(TableAliasPolicy::WhenJoined),
            "always" => Ok(TableAliasPolicy::Always),
            other => Err(format!("Unknown table alias policy '{}'", other)),
        }
    }
}

/// Renders `node` into SQL text and its ordered bindings.
pub fn render(
    node: &Node,
    quoting: &dyn QuotingStrategy,
    table_aliases: TableAliasPolicy,
) -> Result<TranslatedQuery, TranslationError> {
    let mut renderer = SqlRenderer {
        quoting,
        table_aliases,
        binder: ParameterBinder::new(),
        qualify: false,
    };
    let sql = renderer.render_node(node)?;
    Ok(renderer.binder.finish(sql))
}

struct SqlRenderer<'q> {
    quoting: &'q dyn QuotingStrategy,
    table_aliases: TableAliasPolicy,
    binder: ParameterBinder,
    /// Whether columns and tables of the current statement carry aliases.
    qualify: bool,
}

impl SqlRenderer<'_> {
    fn render_node(&mut self, node: &Node) -> Result<String, TranslationError> {
        let sql = match node {
            Node::Select(select) => {
                let outer = self.qualify;
                let has_joins = !Node::flatten_fragments(&select.joins).is_empty();
                self.qualify = has_joins || self.table_aliases == TableAliasPolicy::Always;
                let sql = self.render_select(select);
                self.qualify = outer;
                sql?
            }
            Node::Insert(_) | Node::Update(_) | Node::Delete(_) => {
                let outer = std::mem::replace(&mut self.qualify, false);
                let sql = self.render_modification(node);
                self.qualify = outer;
                sql?
            }
            Node::Table(table) => match (&table.alias, self.qualify) {
                (Some(alias), true) => format!("{} {}", self.quoting.quote(&table.name), self.quoting.quote(alias)),
                _ => self.quoting.quote(&table.name),
            },
            Node::Column(column) => {
                let mut sql = match (&column.table, self.qualify) {
                    (Some(table), true) => format!("{}.{}", self.quoting.quote(table), self.quoting.quote(&column.name)),
                    _ => self.quoting.quote(&column.name),
                };
                if let Some(alias) = &column.alias {
                    sql.push_str(" AS ");
                    sql.push_str(&self.quoting.quote(alias));
                }
                sql
            }
            Node::Value(v) => match &v.value {
                Value::ObjectId(id) => {
                    return Err(UnsupportedConstructError::value_shape_with_context(
                        "object id",
                        "object ids must be expanded into key columns",
                        format!("binding {}", id.entity),
                    )
                    .into())
                }
                Value::List(_) => {
                    return Err(UnsupportedConstructError::value_shape_with_context(
                        "list",
                        "lists can only be bound element by element",
                        "binding a list parameter",
                    )
                    .into())
                }
                _ => self.binder.bind(v).to_string(),
            },
            Node::Join(join) => format!(
                "{} {} ON {}",
                join.kind.keyword(),
                self.render_node(&join.table)?,
                self.render_node(&join.on)?
            ),
            Node::Where(inner) => format!("WHERE {}", self.render_node(inner)?),
            Node::Having(inner) => format!("HAVING {}", self.render_node(inner)?),
            Node::GroupBy(items) => format!("GROUP BY {}", self.render_list(items, ", ")?),
            Node::OrderBy(items) => format!("ORDER BY {}", self.render_list(items, ", ")?),
            Node::OrderItem(item) => {
                let expr = self.render_node(&item.expr)?;
                if item.descending {
                    format!("{} DESC", expr)
                } else {
                    expr
                }
            }
            Node::Case(case) => {
                let mut sql = String::from("CASE");
                for (when, then) in &case.when_then {
                    sql.push_str(&format!(" WHEN {} THEN {}", self.render_node(when)?, self.render_node(then)?));
                }
                if let Some(else_clause) = &case.else_clause {
                    sql.push_str(&format!(" ELSE {}", self.render_node(else_clause)?));
                }
                sql.push_str(" END");
                sql
            }
            Node::Operator(op) => {
                if op.op.is_unary() {
                    let operand = match op.children.first() {
                        Some(child) => self.render_operand(node, child, 0)?,
                        None => String::new(),
                    };
                    format!("{}{}", op.op.symbol(), operand)
                } else {
                    let mut parts = Vec::with_capacity(op.children.len());
                    for (index, child) in op.children.iter().enumerate() {
                        parts.push(self.render_operand(node, child, index)?);
                    }
                    parts.join(&format!(" {} ", op.op.symbol()))
                }
            }
            Node::Function(function) => match &function.style {
                ArgStyle::NoParens => function.name.clone(),
                ArgStyle::Comma => format!("{}({})", function.name, self.render_list(&function.args, ", ")?),
                ArgStyle::Keyword(keyword) => format!(
                    "{}({})",
                    function.name,
                    self.render_list(&function.args, &format!(" {} ", keyword))?
                ),
            },
            Node::Like(like) | Node::ILike(like) => {
                if like.ignore_case && matches!(node, Node::Like(_)) {
                    return Err(UnsupportedConstructError::RequiresDialectRewrite {
                        construct: "Case-insensitive LIKE".to_string(),
                    }
                    .into());
                }
                let keyword = match (node, like.negated) {
                    (Node::ILike(_), false) => "ILIKE",
                    (Node::ILike(_), true) => "NOT ILIKE",
                    (_, false) => "LIKE",
                    (_, true) => "NOT LIKE",
                };
                let mut sql = format!(
                    "{} {} {}",
                    self.render_operand(node, &like.expr, 0)?,
                    keyword,
                    self.render_operand(node, &like.pattern, 1)?
                );
                if let Some(escape) = like.escape {
                    let escape = if escape == '\'' { "''".to_string() } else { escape.to_string() };
                    sql.push_str(&format!(" ESCAPE '{}'", escape));
                }
                sql
            }
            Node::In(in_node) => format!(
                "{} {}IN {}",
                self.render_operand(node, &in_node.expr, 0)?,
                if in_node.negated { "NOT " } else { "" },
                self.render_node(&in_node.list)?
            ),
            Node::Between(between) => format!(
                "{} {}BETWEEN {} AND {}",
                self.render_operand(node, &between.expr, 0)?,
                if between.negated { "NOT " } else { "" },
                self.render_operand(node, &between.low, 1)?,
                self.render_operand(node, &between.high, 2)?
            ),
            Node::Not(inner) => format!("NOT {}", self.render_operand(node, inner, 0)?),
            Node::IsNull(is_null) => format!(
                "{} IS {}NULL",
                self.render_operand(node, &is_null.expr, 0)?,
                if is_null.negated { "NOT " } else { "" }
            ),
            Node::Extract(extract) => match extract.part.standard_keyword() {
                Some(keyword) => format!("EXTRACT({} FROM {})", keyword, self.render_node(&extract.expr)?),
                None => {
                    return Err(UnsupportedConstructError::RequiresDialectRewrite {
                        construct: format!("Date part {:?}", extract.part),
                    }
                    .into())
                }
            },
            Node::List(items) => format!("({})", self.render_list(items, ", ")?),
            Node::Aliased(aliased) => format!(
                "{} AS {}",
                self.render_node(&aliased.expr)?,
                self.quoting.quote(&aliased.alias)
            ),
            Node::LimitOffset(_) => {
                return Err(UnsupportedConstructError::RequiresDialectRewrite {
                    construct: "LIMIT/OFFSET".to_string(),
                }
                .into())
            }
            Node::Pagination(page) => render_pagination(page),
            Node::Text(sql) => sql.clone(),
            Node::Marker(marker) => {
                return Err(TranslationStateError::UndefinedMarker {
                    marker: marker.to_string(),
                }
                .into())
            }
            Node::Fragment(items) => {
                let mut sql = String::new();
                for item in items {
                    sql.push_str(&self.render_node(item)?);
                }
                sql
            }
        };
        Ok(sql)
    }

    fn render_select(&mut self, select: &SelectNode) -> Result<String, TranslationError> {
        let mut sql = String::from("SELECT ");

        let modifiers = self.render_list(&select.modifiers, " ")?;
        if !modifiers.is_empty() {
            sql.push_str(&modifiers);
            sql.push(' ');
        }

        let columns = self.render_list(&select.columns, ", ")?;
        sql.push_str(if columns.is_empty() { "*" } else { &columns });

        if !select.from.is_empty_fragment() {
            sql.push_str(" FROM ");
            sql.push_str(&self.render_node(&select.from)?);
        }

        let clauses = Node::flatten_fragments(&select.joins)
            .into_iter()
            .chain(
                [
                    &select.where_clause,
                    &select.group_by,
                    &select.having,
                    &select.order_by,
                    &select.limit_offset,
                ]
                .into_iter()
                .flatten()
                .map(|clause| &**clause),
            );
        for clause in clauses {
            let rendered = self.render_node(clause)?;
            if !rendered.is_empty() {
                sql.push(' ');
                sql.push_str(&rendered);
            }
        }
        Ok(sql)
    }

    fn render_modification(&mut self, node: &Node) -> Result<String, TranslationError> {
        let (mut sql, where_clause) = match node {
            Node::Insert(insert) => {
                let table = self.render_node(&insert.table)?;
                let columns = self.render_list(&insert.columns, ", ")?;
                let values = self.render_list(&insert.values, ", ")?;
                return Ok(format!("INSERT INTO {} ({}) VALUES ({})", table, columns, values));
            }
            Node::Update(update) => {
                let mut sql = format!("UPDATE {} SET ", self.render_node(&update.table)?);
                let mut assignments = Vec::with_capacity(update.assignments.len());
                for (column, value) in &update.assignments {
                    assignments.push(format!("{} = {}", self.render_node(column)?, self.render_node(value)?));
                }
                sql.push_str(&assignments.join(", "));
                (sql, &update.where_clause)
            }
            Node::Delete(delete) => (format!("DELETE FROM {}", self.render_node(&delete.table)?), &delete.where_clause),
            other => return self.render_node(other),
        };
        if let Some(where_clause) = where_clause {
            sql.push(' ');
            sql.push_str(&self.render_node(where_clause)?);
        }
        Ok(sql)
    }

    /// Renders `items` with nested fragments flattened, skipping empty output.
    fn render_list(&mut self, items: &[Node], separator: &str) -> Result<String, TranslationError> {
        let mut parts = Vec::with_capacity(items.len());
        for item in Node::flatten_fragments(items) {
            let rendered = self.render_node(item)?;
            if !rendered.is_empty() {
                parts.push(rendered);
            }
        }
        Ok(parts.join(separator))
    }

    fn render_operand(&mut self, parent: &Node, child: &Node, index: usize) -> Result<String, TranslationError> {
        let rendered = self.render_node(child)?;
        if needs_parens(parent, child, index) {
            Ok(format!("({})", rendered))
        } else {
            Ok(rendered)
        }
    }
}

fn render_pagination(page: &PaginationNode) -> String {
    let mut parts = Vec::new();
    match page.style {
        PaginationStyle::LimitOffset => {
            if let Some(limit) = page.limit {
                parts.push(format!("LIMIT {}", limit));
            }
            if let Some(offset) = page.offset {
                parts.push(format!("OFFSET {}", offset));
            }
        }
        PaginationStyle::OffsetFetch => {
            parts.push(format!("OFFSET {} ROWS", page.offset.unwrap_or(0)));
            if let Some(limit) = page.limit {
                parts.push(format!("FETCH NEXT {} ROWS ONLY", limit));
            }
        }
    }
    parts.join(" ")
}
