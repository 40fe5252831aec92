use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::{JdbcType, Value};

/// Discriminant of [`Node`], used as the key of dialect rewrite registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Select,
    Insert,
    Update,
    Delete,
    Table,
    Column,
    Value,
    Join,
    Where,
    Having,
    OrderBy,
    OrderItem,
    GroupBy,
    Case,
    Operator,
    Function,
    Like,
    ILike,
    In,
    Between,
    Not,
    IsNull,
    Extract,
    List,
    Aliased,
    LimitOffset,
    Pagination,
    Text,
    Marker,
    Fragment,
}

/// Dialect-neutral SQL tree. Every node owns its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Select(SelectNode),
    Insert(InsertNode),
    Update(UpdateNode),
    Delete(DeleteNode),
    Table(TableNode),
    Column(ColumnNode),
    Value(ValueNode),
    Join(JoinNode),
    Where(Box<Node>),
    Having(Box<Node>),
    OrderBy(Vec<Node>),
    OrderItem(OrderItemNode),
    GroupBy(Vec<Node>),
    Case(CaseNode),
    Operator(OperatorNode),
    Function(FunctionNode),
    /// Generic pattern match; `ignore_case` must be rewritten by a dialect.
    Like(LikeNode),
    /// Native case-insensitive pattern match.
    ILike(LikeNode),
    In(InNode),
    Between(BetweenNode),
    Not(Box<Node>),
    IsNull(IsNullNode),
    Extract(ExtractNode),
    List(Vec<Node>),
    Aliased(AliasedNode),
    /// Generic pagination request, replaced by [`Node::Pagination`] during dialect processing.
    LimitOffset(LimitOffsetNode),
    Pagination(PaginationNode),
    /// Raw SQL text, emitted verbatim.
    Text(String),
    /// Placeholder for deferred content, resolved by the linking pass.
    Marker(MarkerId),
    /// Sequence of nodes emitted back to back with no separators.
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub String);

impl MarkerId {
    pub fn new(name: impl Into<String>) -> Self {
        MarkerId(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectNode {
    /// Keywords between SELECT and the column list, e.g. DISTINCT.
    pub modifiers: Vec<Node>,
    pub columns: Vec<Node>,
    pub from: Box<Node>,
    pub joins: Vec<Node>,
    pub where_clause: Option<Box<Node>>,
    pub group_by: Option<Box<Node>>,
    pub having: Option<Box<Node>>,
    pub order_by: Option<Box<Node>>,
    pub limit_offset: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertNode {
    pub table: Box<Node>,
    pub columns: Vec<Node>,
    pub values: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNode {
    pub table: Box<Node>,
    /// (column, value) pairs in SET order.
    pub assignments: Vec<(Node, Node)>,
    pub where_clause: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteNode {
    pub table: Box<Node>,
    pub where_clause: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNode {
    pub table: Option<String>,
    pub name: String,
    pub alias: Option<String>,
    pub jdbc_type: Option<JdbcType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueNode {
    pub value: Value,
    pub jdbc_type: JdbcType,
    pub is_array: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinNode {
    pub kind: JoinKind,
    pub table: Box<Node>,
    pub on: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemNode {
    pub expr: Box<Node>,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseNode {
    pub when_then: Vec<(Node, Node)>,
    pub else_clause: Option<Box<Node>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    /// Unary minus.
    Negate,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Concat => "||",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::ShiftLeft => "<<",
            Operator::ShiftRight => ">>",
            Operator::Negate => "-",
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::Negate)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::NotEq
                | Operator::Lt
                | Operator::Le
                | Operator::Gt
                | Operator::Ge
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorNode {
    pub op: Operator,
    pub children: Vec<Node>,
}

/// How function arguments are laid out between the parentheses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgStyle {
    /// `f(a, b)`
    Comma,
    /// `f(a <keyword> b)`, e.g. `POSITION(a IN b)`
    Keyword(String),
    /// `CURRENT_DATE`
    NoParens,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: String,
    pub args: Vec<Node>,
    pub style: ArgStyle,
    pub aggregate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeNode {
    pub expr: Box<Node>,
    pub pattern: Box<Node>,
    pub ignore_case: bool,
    pub negated: bool,
    pub escape: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InNode {
    pub expr: Box<Node>,
    pub list: Box<Node>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetweenNode {
    pub expr: Box<Node>,
    pub low: Box<Node>,
    pub high: Box<Node>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsNullNode {
    pub expr: Box<Node>,
    pub negated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatePart {
    Year,
    Month,
    Week,
    DayOfYear,
    DayOfMonth,
    DayOfWeek,
    Hour,
    Minute,
    Second,
}

impl DatePart {
    /// Keyword accepted by standard `EXTRACT(<part> FROM x)`, if any.
    pub fn standard_keyword(&self) -> Option<&'static str> {
        match self {
            DatePart::Year => Some("YEAR"),
            DatePart::Month => Some("MONTH"),
            DatePart::DayOfMonth => Some("DAY"),
            DatePart::Hour => Some("HOUR"),
            DatePart::Minute => Some("MINUTE"),
            DatePart::Second => Some("SECOND"),
            DatePart::Week | DatePart::DayOfYear | DatePart::DayOfWeek => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractNode {
    pub part: DatePart,
    pub expr: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasedNode {
    pub expr: Box<Node>,
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOffsetNode {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationStyle {
    /// `LIMIT n OFFSET m`
    LimitOffset,
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationNode {
    pub style: PaginationStyle,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Select(_) => NodeKind::Select,
            Node::Insert(_) => NodeKind::Insert,
            Node::Update(_) => NodeKind::Update,
            Node::Delete(_) => NodeKind::Delete,
            Node::Table(_) => NodeKind::Table,
            Node::Column(_) => NodeKind::Column,
            Node::Value(_) => NodeKind::Value,
            Node::Join(_) => NodeKind::Join,
            Node::Where(_) => NodeKind::Where,
            Node::Having(_) => NodeKind::Having,
            Node::OrderBy(_) => NodeKind::OrderBy,
            Node::OrderItem(_) => NodeKind::OrderItem,
            Node::GroupBy(_) => NodeKind::GroupBy,
            Node::Case(_) => NodeKind::Case,
            Node::Operator(_) => NodeKind::Operator,
            Node::Function(_) => NodeKind::Function,
            Node::Like(_) => NodeKind::Like,
            Node::ILike(_) => NodeKind::ILike,
            Node::In(_) => NodeKind::In,
            Node::Between(_) => NodeKind::Between,
            Node::Not(_) => NodeKind::Not,
            Node::IsNull(_) => NodeKind::IsNull,
            Node::Extract(_) => NodeKind::Extract,
            Node::List(_) => NodeKind::List,
            Node::Aliased(_) => NodeKind::Aliased,
            Node::LimitOffset(_) => NodeKind::LimitOffset,
            Node::Pagination(_) => NodeKind::Pagination,
            Node::Text(_) => NodeKind::Text,
            Node::Marker(_) => NodeKind::Marker,
            Node::Fragment(_) => NodeKind::Fragment,
        }
    }

    /// Direct children in rendering order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Select(select) => {
                let mut children: Vec<&Node> = Vec::new();
                children.extend(select.modifiers.iter());
                children.extend(select.columns.iter());
                children.push(&select.from);
                children.extend(select.joins.iter());
                for clause in [
                    &select.where_clause,
                    &select.group_by,
                    &select.having,
                    &select.order_by,
                    &select.limit_offset,
                ]
                .into_iter()
                .flatten()
                {
                    children.push(clause);
                }
                children
            }
            Node::Insert(insert) => {
                let mut children: Vec<&Node> = vec![&*insert.table];
                children.extend(insert.columns.iter());
                children.extend(insert.values.iter());
                children
            }
            Node::Update(update) => {
                let mut children: Vec<&Node> = vec![&*update.table];
                for (column, value) in &update.assignments {
                    children.push(column);
                    children.push(value);
                }
                if let Some(where_clause) = &update.where_clause {
                    children.push(where_clause);
                }
                children
            }
            Node::Delete(delete) => {
                let mut children: Vec<&Node> = vec![&*delete.table];
                if let Some(where_clause) = &delete.where_clause {
                    children.push(where_clause);
                }
                children
            }
            Node::Join(join) => vec![&*join.table, &*join.on],
            Node::Where(inner) | Node::Having(inner) | Node::Not(inner) => vec![&**inner],
            Node::OrderBy(items) | Node::GroupBy(items) | Node::List(items) | Node::Fragment(items) => {
                items.iter().collect()
            }
            Node::OrderItem(item) => vec![&*item.expr],
            Node::Case(case) => {
                let mut children: Vec<&Node> = Vec::new();
                for (when, then) in &case.when_then {
                    children.push(when);
                    children.push(then);
                }
                if let Some(else_clause) = &case.else_clause {
                    children.push(else_clause);
                }
                children
            }
            Node::Operator(op) => op.children.iter().collect(),
            Node::Function(function) => function.args.iter().collect(),
            Node::Like(like) | Node::ILike(like) => vec![&*like.expr, &*like.pattern],
            Node::In(in_node) => vec![&*in_node.expr, &*in_node.list],
            Node::Between(between) => vec![&*between.expr, &*between.low, &*between.high],
            Node::IsNull(is_null) => vec![&*is_null.expr],
            Node::Extract(extract) => vec![&*extract.expr],
            Node::Aliased(aliased) => vec![&*aliased.expr],
            Node::Table(_)
            | Node::Column(_)
            | Node::Value(_)
            | Node::LimitOffset(_)
            | Node::Pagination(_)
            | Node::Text(_)
            | Node::Marker(_) => Vec::new(),
        }
    }

    /// Mutable counterpart of [`Node::children`], in the same order.
    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        match self {
            Node::Select(select) => {
                let mut children: Vec<&mut Node> = Vec::new();
                children.extend(select.modifiers.iter_mut());
                children.extend(select.columns.iter_mut());
                children.push(&mut select.from);
                children.extend(select.joins.iter_mut());
                for clause in [
                    &mut select.where_clause,
                    &mut select.group_by,
                    &mut select.having,
                    &mut select.order_by,
                    &mut select.limit_offset,
                ]
                .into_iter()
                .flatten()
                {
                    children.push(clause);
                }
                children
            }
            Node::Insert(insert) => {
                let mut children: Vec<&mut Node> = vec![&mut *insert.table];
                children.extend(insert.columns.iter_mut());
                children.extend(insert.values.iter_mut());
                children
            }
            Node::Update(update) => {
                let mut children: Vec<&mut Node> = vec![&mut *update.table];
                for (column, value) in update.assignments.iter_mut() {
                    children.push(column);
                    children.push(value);
                }
                if let Some(where_clause) = update.where_clause.as_mut() {
                    children.push(where_clause);
                }
                children
            }
            Node::Delete(delete) => {
                let mut children: Vec<&mut Node> = vec![&mut *delete.table];
                if let Some(where_clause) = delete.where_clause.as_mut() {
                    children.push(where_clause);
                }
                children
            }
            Node::Join(join) => vec![&mut *join.table, &mut *join.on],
            Node::Where(inner) | Node::Having(inner) | Node::Not(inner) => vec![&mut **inner],
            Node::OrderBy(items) | Node::GroupBy(items) | Node::List(items) | Node::Fragment(items) => {
                items.iter_mut().collect()
            }
            Node::OrderItem(item) => vec![&mut *item.expr],
            Node::Case(case) => {
                let mut children: Vec<&mut Node> = Vec::new();
                for (when, then) in case.when_then.iter_mut() {
                    children.push(when);
                    children.push(then);
                }
                if let Some(else_clause) = case.else_clause.as_mut() {
                    children.push(else_clause);
                }
                children
            }
            Node::Operator(op) => op.children.iter_mut().collect(),
            Node::Function(function) => function.args.iter_mut().collect(),
            Node::Like(like) | Node::ILike(like) => vec![&mut *like.expr, &mut *like.pattern],
            Node::In(in_node) => vec![&mut *in_node.expr, &mut *in_node.list],
            Node::Between(between) => {
                vec![&mut *between.expr, &mut *between.low, &mut *between.high]
            }
            Node::IsNull(is_null) => vec![&mut *is_null.expr],
            Node::Extract(extract) => vec![&mut *extract.expr],
            Node::Aliased(aliased) => vec![&mut *aliased.expr],
            Node::Table(_)
            | Node::Column(_)
            | Node::Value(_)
            | Node::LimitOffset(_)
            | Node::Pagination(_)
            | Node::Text(_)
            | Node::Marker(_) => Vec::new(),
        }
    }

    /// True for nodes that produce no output at all (an empty fragment).
    pub fn is_empty_fragment(&self) -> bool {
        match self {
            Node::Fragment(items) => items.iter().all(|n| n.is_empty_fragment()),
            _ => false,
        }
    }

    /// Expands nested fragments so list-shaped clauses can place separators
    /// between real items only.
    pub fn flatten_fragments(nodes: &[Node]) -> Vec<&Node> {
        let mut flat = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Fragment(items) => flat.extend(Node::flatten_fragments(items)),
                other => flat.push(other),
            }
        }
        flat
    }

    /// True if any aggregate function occurs in this subtree.
    pub fn contains_aggregate(&self) -> bool {
        if let Node::Function(function) = self {
            if function.aggregate {
                return true;
            }
        }
        self.children().iter().any(|c| c.contains_aggregate())
    }

    /// Walks the subtree depth-first, calling `visit` on every node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}
