//! Composable constructors for [`Node`] trees.
//!
//! Every builder is consumed by `build()`, so one builder yields exactly one
//! node. A configuration that must appear twice in a tree is cloned and built
//! twice.

use super::node::*;
use super::value::{JdbcType, Value};

pub fn table(name: impl Into<String>) -> TableBuilder {
    TableBuilder {
        name: name.into(),
        alias: None,
    }
}

pub fn column(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder {
        table: None,
        name: name.into(),
        alias: None,
        jdbc_type: None,
    }
}

pub fn value(value: impl Into<Value>) -> ValueBuilder {
    let value = value.into();
    let jdbc_type = value.default_jdbc_type();
    ValueBuilder {
        value,
        jdbc_type,
        is_array: false,
    }
}

pub fn text(sql: impl Into<String>) -> Node {
    Node::Text(sql.into())
}

pub fn function(name: impl Into<String>) -> FunctionBuilder {
    FunctionBuilder {
        name: name.into(),
        args: Vec::new(),
        style: ArgStyle::Comma,
        aggregate: false,
    }
}

pub fn case() -> CaseBuilder {
    CaseBuilder::default()
}

pub fn exp(node: impl Into<Node>) -> ExpressionBuilder {
    ExpressionBuilder { node: node.into() }
}

pub fn select() -> SelectBuilder {
    SelectBuilder::default()
}

pub fn join(kind: JoinKind, table: TableBuilder) -> JoinBuilder {
    JoinBuilder {
        kind,
        table: table.build(),
        on: Vec::new(),
    }
}

pub fn insert(table: TableBuilder) -> InsertBuilder {
    InsertBuilder {
        table: table.build(),
        columns: Vec::new(),
        values: Vec::new(),
    }
}

pub fn update(table: TableBuilder) -> UpdateBuilder {
    UpdateBuilder {
        table: table.build(),
        assignments: Vec::new(),
        where_clause: None,
    }
}

pub fn delete(table: TableBuilder) -> DeleteBuilder {
    DeleteBuilder {
        table: table.build(),
        where_clause: None,
    }
}

/// Joins `nodes` with `op`, collapsing the single-operand case.
pub fn combine(op: Operator, mut nodes: Vec<Node>) -> Option<Node> {
    match nodes.len() {
        0 => None,
        1 => nodes.pop(),
        _ => Some(Node::Operator(OperatorNode { op, children: nodes })),
    }
}

#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    alias: Option<String>,
}

impl TableBuilder {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn alias_opt(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    pub fn build(self) -> Node {
        Node::Table(TableNode {
            name: self.name,
            alias: self.alias,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    table: Option<String>,
    name: String,
    alias: Option<String>,
    jdbc_type: Option<JdbcType>,
}

impl ColumnBuilder {
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn table_opt(mut self, table: Option<String>) -> Self {
        self.table = table;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn jdbc_type(mut self, jdbc_type: JdbcType) -> Self {
        self.jdbc_type = Some(jdbc_type);
        self
    }

    pub fn build(self) -> Node {
        Node::Column(ColumnNode {
            table: self.table,
            name: self.name,
            alias: self.alias,
            jdbc_type: self.jdbc_type,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValueBuilder {
    value: Value,
    jdbc_type: JdbcType,
    is_array: bool,
}

impl ValueBuilder {
    pub fn jdbc_type(mut self, jdbc_type: JdbcType) -> Self {
        self.jdbc_type = jdbc_type;
        self
    }

    pub fn jdbc_type_opt(mut self, jdbc_type: Option<JdbcType>) -> Self {
        if let Some(jdbc_type) = jdbc_type {
            self.jdbc_type = jdbc_type;
        }
        self
    }

    pub fn array(mut self, is_array: bool) -> Self {
        self.is_array = is_array;
        self
    }

    pub fn build(self) -> Node {
        Node::Value(ValueNode {
            value: self.value,
            jdbc_type: self.jdbc_type,
            is_array: self.is_array,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    name: String,
    args: Vec<Node>,
    style: ArgStyle,
    aggregate: bool,
}

impl FunctionBuilder {
    pub fn arg(mut self, arg: impl Into<Node>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = Node>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn style(mut self, style: ArgStyle) -> Self {
        self.style = style;
        self
    }

    pub fn aggregate(mut self, aggregate: bool) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn build(self) -> Node {
        Node::Function(FunctionNode {
            name: self.name,
            args: self.args,
            style: self.style,
            aggregate: self.aggregate,
        })
    }
}

/// Accumulates `WHEN`/`THEN` branches and an optional `ELSE` branch; the
/// branches become children in declaration order when built.
#[derive(Debug, Clone, Default)]
pub struct CaseBuilder {
    when_then: Vec<(Node, Node)>,
    else_clause: Option<Node>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: impl Into<Node>, result: impl Into<Node>) -> Self {
        self.when_then.push((condition.into(), result.into()));
        self
    }

    pub fn otherwise(mut self, result: impl Into<Node>) -> Self {
        self.else_clause = Some(result.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.when_then.is_empty()
    }

    pub fn build(self) -> Node {
        Node::Case(CaseNode {
            when_then: self.when_then,
            else_clause: self.else_clause.map(Box::new),
        })
    }
}

/// Fluent wrapper for building expression trees around an existing node.
#[derive(Debug, Clone)]
pub struct ExpressionBuilder {
    node: Node,
}

impl ExpressionBuilder {
    fn binary(self, op: Operator, rhs: impl Into<Node>) -> Self {
        ExpressionBuilder {
            node: Node::Operator(OperatorNode {
                op,
                children: vec![self.node, rhs.into()],
            }),
        }
    }

    /// Appends to an existing n-ary node of the same operator instead of nesting.
    fn chain(self, op: Operator, rhs: impl Into<Node>) -> Self {
        match self.node {
            Node::Operator(OperatorNode {
                op: existing,
                mut children,
            }) if existing == op => {
                children.push(rhs.into());
                ExpressionBuilder {
                    node: Node::Operator(OperatorNode { op, children }),
                }
            }
            node => ExpressionBuilder { node }.binary(op, rhs),
        }
    }

    pub fn eq(self, rhs: impl Into<Node>) -> Self {
        self.binary(Operator::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Node>) -> Self {
        self.binary(Operator::NotEq, rhs)
    }

    pub fn lt(self, rhs: impl Into<Node>) -> Self {
        self.binary(Operator::Lt, rhs)
    }

    pub fn le(self, rhs: impl Into<Node>) -> Self {
        self.binary(Operator::Le, rhs)
    }

    pub fn gt(self, rhs: impl Into<Node>) -> Self {
        self.binary(Operator::Gt, rhs)
    }

    pub fn ge(self, rhs: impl Into<Node>) -> Self {
        self.binary(Operator::Ge, rhs)
    }

    pub fn op(self, op: Operator, rhs: impl Into<Node>) -> Self {
        self.binary(op, rhs)
    }

    pub fn and(self, rhs: impl Into<Node>) -> Self {
        self.chain(Operator::And, rhs)
    }

    pub fn or(self, rhs: impl Into<Node>) -> Self {
        self.chain(Operator::Or, rhs)
    }

    pub fn not(self) -> Self {
        ExpressionBuilder {
            node: Node::Not(Box::new(self.node)),
        }
    }

    pub fn is_null(self) -> Self {
        ExpressionBuilder {
            node: Node::IsNull(IsNullNode {
                expr: Box::new(self.node),
                negated: false,
            }),
        }
    }

    pub fn is_not_null(self) -> Self {
        ExpressionBuilder {
            node: Node::IsNull(IsNullNode {
                expr: Box::new(self.node),
                negated: true,
            }),
        }
    }

    pub fn like(self, pattern: impl Into<Node>) -> LikeBuilder {
        LikeBuilder {
            expr: self.node,
            pattern: pattern.into(),
            ignore_case: false,
            negated: false,
            escape: None,
        }
    }

    pub fn in_list(self, list: impl Into<Node>, negated: bool) -> Self {
        ExpressionBuilder {
            node: Node::In(InNode {
                expr: Box::new(self.node),
                list: Box::new(list.into()),
                negated,
            }),
        }
    }

    pub fn between(self, low: impl Into<Node>, high: impl Into<Node>, negated: bool) -> Self {
        ExpressionBuilder {
            node: Node::Between(BetweenNode {
                expr: Box::new(self.node),
                low: Box::new(low.into()),
                high: Box::new(high.into()),
                negated,
            }),
        }
    }

    pub fn alias(self, alias: impl Into<String>) -> Self {
        ExpressionBuilder {
            node: Node::Aliased(AliasedNode {
                expr: Box::new(self.node),
                alias: alias.into(),
            }),
        }
    }

    pub fn build(self) -> Node {
        self.node
    }
}

#[derive(Debug, Clone)]
pub struct LikeBuilder {
    expr: Node,
    pattern: Node,
    ignore_case: bool,
    negated: bool,
    escape: Option<char>,
}

impl LikeBuilder {
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn negated(mut self, negated: bool) -> Self {
        self.negated = negated;
        self
    }

    pub fn escape(mut self, escape: Option<char>) -> Self {
        self.escape = escape;
        self
    }

    pub fn build(self) -> Node {
        Node::Like(LikeNode {
            expr: Box::new(self.expr),
            pattern: Box::new(self.pattern),
            ignore_case: self.ignore_case,
            negated: self.negated,
            escape: self.escape,
        })
    }
}

#[derive(Debug, Clone)]
pub struct JoinBuilder {
    kind: JoinKind,
    table: Node,
    on: Vec<Node>,
}

impl JoinBuilder {
    /// Adds one `ON` condition; several conditions are AND-ed in order.
    pub fn on(mut self, condition: impl Into<Node>) -> Self {
        self.on.push(condition.into());
        self
    }

    pub fn build(self) -> Node {
        let on = combine(Operator::And, self.on).unwrap_or_else(|| text("1=1"));
        Node::Join(JoinNode {
            kind: self.kind,
            table: Box::new(self.table),
            on: Box::new(on),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    modifiers: Vec<Node>,
    columns: Vec<Node>,
    from: Option<Node>,
    joins: Vec<Node>,
    where_clause: Option<Node>,
    group_by: Vec<Node>,
    having: Option<Node>,
    order_by: Vec<Node>,
    limit_offset: Option<LimitOffsetNode>,
}

impl SelectBuilder {
    pub fn modifier(mut self, modifier: impl Into<Node>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    pub fn distinct(self) -> Self {
        self.modifier(text("DISTINCT"))
    }

    pub fn column(mut self, column: impl Into<Node>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Node>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn from(mut self, table: TableBuilder) -> Self {
        self.from = Some(table.build());
        self
    }

    pub fn join(mut self, join: impl Into<Node>) -> Self {
        self.joins.push(join.into());
        self
    }

    pub fn where_(mut self, condition: impl Into<Node>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    pub fn group_by(mut self, expr: impl Into<Node>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    pub fn having(mut self, condition: impl Into<Node>) -> Self {
        self.having = Some(condition.into());
        self
    }

    pub fn order_by(mut self, expr: impl Into<Node>, descending: bool) -> Self {
        self.order_by.push(Node::OrderItem(OrderItemNode {
            expr: Box::new(expr.into()),
            descending,
        }));
        self
    }

    pub fn limit_offset(mut self, limit: Option<u64>, offset: Option<u64>) -> Self {
        if limit.is_some() || offset.is_some() {
            self.limit_offset = Some(LimitOffsetNode { limit, offset });
        }
        self
    }

    /// Builds the statement. A select without a FROM table selects from an
    /// empty fragment, which renders nothing.
    pub fn build(self) -> Node {
        Node::Select(SelectNode {
            modifiers: self.modifiers,
            columns: self.columns,
            from: Box::new(self.from.unwrap_or(Node::Fragment(Vec::new()))),
            joins: self.joins,
            where_clause: self.where_clause.map(|w| Box::new(Node::Where(Box::new(w)))),
            group_by: if self.group_by.is_empty() {
                None
            } else {
                Some(Box::new(Node::GroupBy(self.group_by)))
            },
            having: self.having.map(|h| Box::new(Node::Having(Box::new(h)))),
            order_by: if self.order_by.is_empty() {
                None
            } else {
                Some(Box::new(Node::OrderBy(self.order_by)))
            },
            limit_offset: self
                .limit_offset
                .map(|lo| Box::new(Node::LimitOffset(lo))),
        })
    }
}

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: Node,
    columns: Vec<Node>,
    values: Vec<Node>,
}

impl InsertBuilder {
    pub fn value(mut self, column: impl Into<Node>, value: impl Into<Node>) -> Self {
        self.columns.push(column.into());
        self.values.push(value.into());
        self
    }

    pub fn build(self) -> Node {
        Node::Insert(InsertNode {
            table: Box::new(self.table),
            columns: self.columns,
            values: self.values,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: Node,
    assignments: Vec<(Node, Node)>,
    where_clause: Option<Node>,
}

impl UpdateBuilder {
    pub fn set(mut self, column: impl Into<Node>, value: impl Into<Node>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    pub fn where_(mut self, condition: impl Into<Node>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    pub fn build(self) -> Node {
        Node::Update(UpdateNode {
            table: Box::new(self.table),
            assignments: self.assignments,
            where_clause: self.where_clause.map(|w| Box::new(Node::Where(Box::new(w)))),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: Node,
    where_clause: Option<Node>,
}

impl DeleteBuilder {
    pub fn where_(mut self, condition: impl Into<Node>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    pub fn build(self) -> Node {
        Node::Delete(DeleteNode {
            table: Box::new(self.table),
            where_clause: self.where_clause.map(|w| Box::new(Node::Where(Box::new(w)))),
        })
    }
}

impl From<TableBuilder> for Node {
    fn from(builder: TableBuilder) -> Self {
        builder.build()
    }
}

impl From<ColumnBuilder> for Node {
    fn from(builder: ColumnBuilder) -> Self {
        builder.build()
    }
}

impl From<ValueBuilder> for Node {
    fn from(builder: ValueBuilder) -> Self {
        builder.build()
    }
}

impl From<FunctionBuilder> for Node {
    fn from(builder: FunctionBuilder) -> Self {
        builder.build()
    }
}

impl From<CaseBuilder> for Node {
    fn from(builder: CaseBuilder) -> Self {
        builder.build()
    }
}

impl From<ExpressionBuilder> for Node {
    fn from(builder: ExpressionBuilder) -> Self {
        builder.build()
    }
}

impl From<LikeBuilder> for Node {
    fn from(builder: LikeBuilder) -> Self {
        builder.build()
    }
}

impl From<JoinBuilder> for Node {
    fn from(builder: JoinBuilder) -> Self {
        builder.build()
    }
}
