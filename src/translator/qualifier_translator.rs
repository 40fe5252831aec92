//! Translates qualifier expressions into SQL expression nodes.
//!
//! Paths go through the path resolver, so every join a qualifier needs is
//! planned as a side effect of translating it. Bound values borrow their
//! JDBC type from the column they are compared with.

use log::debug;

use super::errors::{JoinPlanningError, TranslationError, UnsupportedConstructError};
use super::function_registry::translate_function;
use super::path_resolver::{join_relationship, relationship_joins, resolve, PathTarget, ResolvedPath};
use super::translation_ctx::TranslationContext;
use crate::entity_catalog::{Attribute, Entity, JoinPair};
use crate::qualifier_parser::{ArithmeticOp, ComparisonOp, Expression, PathExpression};
use crate::sql_ast::builder::{case, column, combine, exp, text, value};
use crate::sql_ast::{JdbcType, Node, Operator, OperatorNode, Value};
use crate::sql_generator::binder::expand_key_comparison;

/// A translated operand, kept apart from plain nodes until we know what it
/// is compared with.
enum Operand<'a> {
    Column { node: Node, jdbc_type: JdbcType },
    Relationship(ResolvedPath<'a>),
    Value(Value),
    Expr(Node),
}

impl Operand<'_> {
    fn jdbc_type(&self) -> Option<JdbcType> {
        match self {
            Operand::Column { jdbc_type, .. } => Some(*jdbc_type),
            _ => None,
        }
    }

    fn is_value(&self) -> bool {
        matches!(self, Operand::Value(_) | Operand::Expr(_))
    }
}

pub struct QualifierTranslator<'c, 'a> {
    ctx: &'c mut TranslationContext<'a>,
    root: &'a Entity,
    root_var: Option<String>,
}

impl<'c, 'a> QualifierTranslator<'c, 'a> {
    pub fn new(ctx: &'c mut TranslationContext<'a>, root: &'a Entity, root_var: Option<&str>) -> Self {
        QualifierTranslator {
            ctx,
            root,
            root_var: root_var.map(str::to_string),
        }
    }

    /// Translates an expression in boolean position, e.g. a WHERE clause.
    pub fn translate_condition(&mut self, expr: &Expression) -> Result<Node, TranslationError> {
        match expr {
            Expression::And(operands) => self.connective(Operator::And, operands, "1=1"),
            Expression::Or(operands) => self.connective(Operator::Or, operands, "1=0"),
            Expression::Not(inner) => Ok(exp(self.translate_condition(inner)?).not().build()),
            Expression::Comparison { op, lhs, rhs } => self.comparison(*op, lhs, rhs),
            Expression::Like {
                expr,
                pattern,
                ignore_case,
                negated,
                escape,
            } => {
                let lhs = self.operand(expr)?;
                let hint = lhs.jdbc_type();
                let lhs = self.operand_node(lhs, None)?;
                let pattern = self.operand(pattern)?;
                let pattern = self.operand_node(pattern, hint)?;
                Ok(exp(lhs)
                    .like(pattern)
                    .ignore_case(*ignore_case)
                    .negated(*negated)
                    .escape(*escape)
                    .build())
            }
            Expression::In { expr, list, negated } => self.in_list(expr, list, *negated),
            Expression::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let lhs = self.operand(expr)?;
                let hint = lhs.jdbc_type();
                let lhs = self.operand_node(lhs, None)?;
                let low = self.operand(low)?;
                let low = self.operand_node(low, hint)?;
                let high = self.operand(high)?;
                let high = self.operand_node(high, hint)?;
                Ok(exp(lhs).between(low, high, *negated).build())
            }
            Expression::Literal(Value::Bool(true)) => Ok(text("1=1")),
            Expression::Literal(Value::Bool(false)) => Ok(text("1=0")),
            other => self.translate(other),
        }
    }

    /// Translates an expression in value position, e.g. a result column.
    pub fn translate(&mut self, expr: &Expression) -> Result<Node, TranslationError> {
        match expr {
            Expression::And(_)
            | Expression::Or(_)
            | Expression::Not(_)
            | Expression::Comparison { .. }
            | Expression::Like { .. }
            | Expression::In { .. }
            | Expression::Between { .. } => self.translate_condition(expr),
            Expression::Arithmetic { op, lhs, rhs } => {
                let lhs = self.operand(lhs)?;
                let rhs = self.operand(rhs)?;
                let (lhs_hint, rhs_hint) = (rhs.jdbc_type(), lhs.jdbc_type());
                let lhs = self.operand_node(lhs, lhs_hint)?;
                let rhs = self.operand_node(rhs, rhs_hint)?;
                Ok(exp(lhs).op(arithmetic_operator(*op), rhs).build())
            }
            Expression::Negate(inner) => Ok(Node::Operator(OperatorNode {
                op: Operator::Negate,
                children: vec![self.translate(inner)?],
            })),
            Expression::FunctionCall { name, args } => {
                let mut translated = Vec::with_capacity(args.len());
                for arg in args {
                    translated.push(self.translate(arg)?);
                }
                translate_function(name, translated)
            }
            Expression::List(items) => {
                let mut translated = Vec::with_capacity(items.len());
                for item in items {
                    translated.push(self.translate(item)?);
                }
                Ok(Node::List(translated))
            }
            Expression::Case { when_then, else_expr } => {
                let mut builder = case();
                for (when, then) in when_then {
                    builder = builder.when(self.translate_condition(when)?, self.translate(then)?);
                }
                if let Some(else_expr) = else_expr {
                    builder = builder.otherwise(self.translate(else_expr)?);
                }
                Ok(builder.build())
            }
            Expression::Path(_)
            | Expression::Literal(_)
            | Expression::NamedParameter(_)
            | Expression::PositionalParameter(_) => {
                let operand = self.operand(expr)?;
                self.operand_node(operand, None)
            }
        }
    }

    fn connective(
        &mut self,
        op: Operator,
        operands: &[Expression],
        empty: &str,
    ) -> Result<Node, TranslationError> {
        let mut translated = Vec::with_capacity(operands.len());
        for operand in operands {
            translated.push(self.translate_condition(operand)?);
        }
        Ok(combine(op, translated).unwrap_or_else(|| text(empty)))
    }

    fn operand(&mut self, expr: &Expression) -> Result<Operand<'a>, TranslationError> {
        match expr {
            Expression::Path(path) => self.path_operand(path),
            Expression::Literal(v) => Ok(Operand::Value(v.clone())),
            Expression::NamedParameter(name) => Ok(Operand::Value(self.ctx.named_parameter(name)?.clone())),
            Expression::PositionalParameter(index) => {
                Ok(Operand::Value(self.ctx.positional_parameter(*index)?.clone()))
            }
            other => Ok(Operand::Expr(self.translate(other)?)),
        }
    }

    fn path_operand(&mut self, path: &PathExpression) -> Result<Operand<'a>, TranslationError> {
        let resolved = resolve(self.ctx, self.root, self.root_var.as_deref(), path)?;
        Ok(match resolved.target {
            PathTarget::Attribute(attribute) => Operand::Column {
                node: column(&attribute.column)
                    .table(&resolved.alias)
                    .jdbc_type(attribute.jdbc_type)
                    .build(),
                jdbc_type: attribute.jdbc_type,
            },
            PathTarget::Relationship(_) => Operand::Relationship(resolved),
        })
    }

    /// Lowers an operand to a node. A relationship in value position stands
    /// for its single key column.
    fn operand_node(&mut self, operand: Operand<'a>, hint: Option<JdbcType>) -> Result<Node, TranslationError> {
        match operand {
            Operand::Column { node, .. } | Operand::Expr(node) => Ok(node),
            Operand::Value(v) => bind_value(v, hint),
            Operand::Relationship(path) => {
                let mut keys = self.relationship_keys(&path)?;
                if keys.len() != 1 {
                    return Err(UnsupportedConstructError::value_shape_with_context(
                        "relationship",
                        format!("'{}' has a {}-column key", relationship_name(&path), keys.len()),
                        "A relationship used as a value needs a single-column key",
                    )
                    .into());
                }
                Ok(keys.remove(0).0)
            }
        }
    }

    fn comparison(
        &mut self,
        op: ComparisonOp,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<Node, TranslationError> {
        let mut lhs = self.operand(lhs)?;
        let mut rhs = self.operand(rhs)?;
        let mut op = op;
        // keep the column on the left: `5 < price` becomes `price > 5`
        if lhs.is_value() && !rhs.is_value() {
            std::mem::swap(&mut lhs, &mut rhs);
            op = mirrored(op);
        }

        if let Operand::Relationship(path) = lhs {
            return self.relationship_comparison(op, path, rhs);
        }

        if let Operand::Value(Value::Null) = rhs {
            let lhs = self.operand_node(lhs, None)?;
            match op {
                ComparisonOp::Eq => return Ok(exp(lhs).is_null().build()),
                ComparisonOp::NotEq => return Ok(exp(lhs).is_not_null().build()),
                _ => {
                    return Ok(exp(lhs)
                        .op(comparison_operator(op), bind_value(Value::Null, None)?)
                        .build())
                }
            }
        }

        let (lhs_hint, rhs_hint) = (rhs.jdbc_type(), lhs.jdbc_type());
        let lhs = self.operand_node(lhs, lhs_hint)?;
        let rhs = self.operand_node(rhs, rhs_hint)?;
        Ok(exp(lhs).op(comparison_operator(op), rhs).build())
    }

    /// Compares a relationship with an object id (or a scalar key value),
    /// expanding compound keys column by column.
    fn relationship_comparison(
        &mut self,
        op: ComparisonOp,
        path: ResolvedPath<'a>,
        rhs: Operand<'a>,
    ) -> Result<Node, TranslationError> {
        if !matches!(op, ComparisonOp::Eq | ComparisonOp::NotEq) {
            return Err(UnsupportedConstructError::value_shape_with_context(
                "relationship",
                format!("operator '{}' cannot compare objects", op.symbol()),
                format!("While translating '{}'", relationship_name(&path)),
            )
            .into());
        }
        let keys = self.relationship_keys(&path)?;

        let value = match rhs {
            Operand::Value(v) => v,
            _ => {
                return Err(UnsupportedConstructError::value_shape_with_context(
                    "relationship",
                    "relationships can only be compared with object ids, key values or null",
                    format!("While translating '{}'", relationship_name(&path)),
                )
                .into())
            }
        };

        match value {
            Value::Null => {
                let checks: Vec<Node> = keys
                    .into_iter()
                    .map(|(node, _, _)| {
                        if op == ComparisonOp::Eq {
                            exp(node).is_null().build()
                        } else {
                            exp(node).is_not_null().build()
                        }
                    })
                    .collect();
                let connective = if op == ComparisonOp::Eq {
                    Operator::And
                } else {
                    Operator::Or
                };
                Ok(combine(connective, checks).unwrap_or_else(|| text("1=1")))
            }
            Value::ObjectId(id) => {
                let mut pairs = Vec::with_capacity(keys.len());
                for (node, key_column, jdbc_type) in keys {
                    let v = id.value_for(&key_column).cloned().ok_or_else(|| {
                        JoinPlanningError::IncompleteObjectId {
                            entity: id.entity.clone(),
                            column: key_column.clone(),
                        }
                    })?;
                    pairs.push((node, bind_value(v, Some(jdbc_type))?));
                }
                expand_key_comparison(comparison_operator(op), pairs)
            }
            Value::List(_) => Err(UnsupportedConstructError::value_shape_with_context(
                "list",
                "a list cannot be compared with a relationship",
                format!("While translating '{}'", relationship_name(&path)),
            )
            .into()),
            scalar => {
                if keys.len() != 1 {
                    return Err(UnsupportedConstructError::value_shape_with_context(
                        "scalar",
                        format!("'{}' has a {}-column key", relationship_name(&path), keys.len()),
                        "Compare compound keys with an object id",
                    )
                    .into());
                }
                let (node, _, jdbc_type) = keys.into_iter().next().ok_or_else(|| {
                    JoinPlanningError::EmptyJoin {
                        entity: path.entity.name.clone(),
                        relationship: relationship_name(&path),
                    }
                })?;
                Ok(exp(node)
                    .op(comparison_operator(op), bind_value(scalar, Some(jdbc_type))?)
                    .build())
            }
        }
    }

    /// Key columns standing for a terminal relationship, in the target's
    /// primary key order, as (column node, target key column, type).
    ///
    /// A to-one relationship whose joins are exactly the target key compares
    /// the source's foreign key columns without a join. Anything else, such as
    /// the dependent side of a foreign key, joins the target and uses its
    /// primary key.
    fn relationship_keys(
        &mut self,
        path: &ResolvedPath<'a>,
    ) -> Result<Vec<(Node, String, JdbcType)>, TranslationError> {
        let PathTarget::Relationship(relationship) = path.target else {
            return Ok(Vec::new());
        };
        let catalog = self.ctx.catalog();
        let target = catalog.get_entity(&relationship.target)?;
        let target_keys = target.primary_keys();

        if !relationship.to_many {
            let joins = relationship_joins(catalog, path.entity, relationship)?;
            if let Some(keys) = foreign_keys(&joins, &target_keys, &path.alias) {
                return Ok(keys);
            }
            debug!(
                "{}.{} does not join on the key of {}, joining it",
                path.entity.name, relationship.name, target.name
            );
        }

        let joined = join_relationship(
            self.ctx,
            path.entity,
            &path.id_path,
            &path.alias,
            relationship,
            path.outer,
        )?;
        Ok(target_keys
            .iter()
            .map(|key| {
                (
                    column(&key.column)
                        .table(&joined.alias)
                        .jdbc_type(key.jdbc_type)
                        .build(),
                    key.column.clone(),
                    key.jdbc_type,
                )
            })
            .collect())
    }

    fn in_list(
        &mut self,
        expr: &Expression,
        list: &Expression,
        negated: bool,
    ) -> Result<Node, TranslationError> {
        let (lhs, hint, key_column) = match self.operand(expr)? {
            Operand::Relationship(path) => {
                let mut keys = self.relationship_keys(&path)?;
                if keys.len() != 1 {
                    return Err(UnsupportedConstructError::value_shape_with_context(
                        "relationship",
                        format!("'{}' has a {}-column key", relationship_name(&path), keys.len()),
                        "IN over a relationship needs a single-column key",
                    )
                    .into());
                }
                let (node, key_column, jdbc_type) = keys.remove(0);
                (node, Some(jdbc_type), Some(key_column))
            }
            other => {
                let hint = other.jdbc_type();
                (self.operand_node(other, None)?, hint, None)
            }
        };

        let items: Vec<Expression> = match list {
            Expression::List(items) => items.clone(),
            single => vec![single.clone()],
        };

        let mut elements = Vec::with_capacity(items.len());
        for item in &items {
            match self.operand(item)? {
                Operand::Value(Value::List(values)) => {
                    for v in values {
                        elements.push(self.in_element(v, hint, key_column.as_deref())?);
                    }
                }
                Operand::Value(v) => elements.push(self.in_element(v, hint, key_column.as_deref())?),
                other => elements.push(self.operand_node(other, None)?),
            }
        }

        if elements.is_empty() {
            return Ok(text(if negated { "1=1" } else { "1=0" }));
        }
        Ok(exp(lhs).in_list(Node::List(elements), negated).build())
    }

    fn in_element(
        &self,
        v: Value,
        hint: Option<JdbcType>,
        key_column: Option<&str>,
    ) -> Result<Node, TranslationError> {
        let v = match (v, key_column) {
            (Value::ObjectId(id), Some(key_column)) => {
                id.value_for(key_column).cloned().ok_or_else(|| JoinPlanningError::IncompleteObjectId {
                    entity: id.entity.clone(),
                    column: key_column.to_string(),
                })?
            }
            (v, _) => v,
        };
        Ok(match bind_value(v, hint)? {
            Node::Value(mut node) => {
                node.is_array = true;
                Node::Value(node)
            }
            other => other,
        })
    }
}

/// Builds a bound value node. A single-column object id stands for its key
/// value; compound ids and lists have no scalar form.
pub(crate) fn bind_value(v: Value, hint: Option<JdbcType>) -> Result<Node, TranslationError> {
    match v {
        Value::ObjectId(id) => {
            if id.snapshot.len() != 1 {
                return Err(UnsupportedConstructError::value_shape_with_context(
                    "compound object id",
                    format!("'{}' has {} key columns", id.entity, id.snapshot.len()),
                    "Compare compound ids with a relationship path",
                )
                .into());
            }
            let key_value = id.snapshot.into_values().next().unwrap_or(Value::Null);
            bind_value(key_value, hint)
        }
        Value::List(_) => Err(UnsupportedConstructError::ValueShape {
            shape: "list".to_string(),
            reason: "lists are only allowed on the right side of IN".to_string(),
        }
        .into()),
        v => Ok(value(v).jdbc_type_opt(hint).build()),
    }
}

fn relationship_name(path: &ResolvedPath<'_>) -> String {
    match path.target {
        PathTarget::Relationship(relationship) => relationship.name.clone(),
        PathTarget::Attribute(attribute) => attribute.name.clone(),
    }
}

fn mirrored(op: ComparisonOp) -> ComparisonOp {
    match op {
        ComparisonOp::Lt => ComparisonOp::Gt,
        ComparisonOp::Le => ComparisonOp::Ge,
        ComparisonOp::Gt => ComparisonOp::Lt,
        ComparisonOp::Ge => ComparisonOp::Le,
        other => other,
    }
}

pub fn comparison_operator(op: ComparisonOp) -> Operator {
    match op {
        ComparisonOp::Eq => Operator::Eq,
        ComparisonOp::NotEq => Operator::NotEq,
        ComparisonOp::Lt => Operator::Lt,
        ComparisonOp::Le => Operator::Le,
        ComparisonOp::Gt => Operator::Gt,
        ComparisonOp::Ge => Operator::Ge,
    }
}

fn arithmetic_operator(op: ArithmeticOp) -> Operator {
    match op {
        ArithmeticOp::Add => Operator::Add,
        ArithmeticOp::Sub => Operator::Sub,
        ArithmeticOp::Mul => Operator::Mul,
        ArithmeticOp::Div => Operator::Div,
    }
}

/// Source columns standing for the target key, when the joins are exactly
/// the target's primary key columns.
fn foreign_keys(
    joins: &[JoinPair],
    target_keys: &[&Attribute],
    alias: &str,
) -> Option<Vec<(Node, String, JdbcType)>> {
    if target_keys.is_empty() || joins.len() != target_keys.len() {
        return None;
    }
    target_keys
        .iter()
        .map(|key| {
            let pair = joins.iter().find(|p| p.target == key.column)?;
            Some((
                column(&pair.source).table(alias).jdbc_type(key.jdbc_type).build(),
                key.column.clone(),
                key.jdbc_type,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_catalog::{Attribute, EntityCatalog, Relationship};
    use crate::qualifier_parser::parse_qualifier;
    use crate::sql_ast::ObjectId;
    use crate::translator::errors::SchemaResolutionError;
    use crate::translator::query::QueryParameters;

    fn catalog() -> EntityCatalog {
        let pk = Entity::new("CompoundPk", "COMPOUND_PK_TEST")
            .with_attribute(Attribute::new("key1", "KEY1", JdbcType::Integer).primary_key())
            .with_attribute(Attribute::new("key2", "KEY2", JdbcType::Varchar).primary_key())
            .with_relationship(Relationship::to_many("fkArray", "CompoundFk").reverse("toCompoundPk"));
        let fk = Entity::new("CompoundFk", "COMPOUND_FK_TEST")
            .with_attribute(Attribute::new("pkey", "PKEY", JdbcType::Integer).primary_key())
            .with_attribute(Attribute::new("name", "NAME", JdbcType::Varchar))
            .with_attribute(Attribute::new("f1", "F_KEY1", JdbcType::Integer))
            .with_attribute(Attribute::new("f2", "F_KEY2", JdbcType::Varchar))
            .with_relationship(
                Relationship::to_one("toCompoundPk", "CompoundPk")
                    .join("F_KEY1", "KEY1")
                    .join("F_KEY2", "KEY2"),
            );
        EntityCatalog::new()
            .with_entity(pk)
            .and_then(|c| c.with_entity(fk))
            .unwrap()
    }

    fn translate(catalog: &EntityCatalog, params: &QueryParameters, entity: &str, qualifier: &str) -> Result<Node, TranslationError> {
        let mut ctx = TranslationContext::new(catalog, params, "t");
        let root = catalog.get_entity(entity).unwrap();
        let expr = parse_qualifier(qualifier).unwrap();
        QualifierTranslator::new(&mut ctx, root, None).translate_condition(&expr)
    }

    fn compound_id() -> Value {
        Value::ObjectId(ObjectId::new("CompoundPk").with("KEY1", 3).with("KEY2", "aaa"))
    }

    #[test]
    fn test_compound_equality_expands_to_and() {
        let catalog = catalog();
        let params = QueryParameters::default().with_named("id", compound_id());
        let node = translate(&catalog, &params, "CompoundFk", "toCompoundPk = $id").unwrap();
        match node {
            Node::Operator(op) => {
                assert_eq!(op.op, Operator::And);
                assert_eq!(op.children.len(), 2);
            }
            other => panic!("expected AND, got {:?}", other),
        }
    }

    #[test]
    fn test_compound_inequality_expands_to_or() {
        let catalog = catalog();
        let params = QueryParameters::default().with_named("id", compound_id());
        let node = translate(&catalog, &params, "CompoundFk", "toCompoundPk <> $id").unwrap();
        assert!(matches!(node, Node::Operator(ref op) if op.op == Operator::Or));
    }

    #[test]
    fn test_incomplete_object_id() {
        let catalog = catalog();
        let id = Value::ObjectId(ObjectId::new("CompoundPk").with("KEY1", 3));
        let params = QueryParameters::default().with_named("id", id);
        let err = translate(&catalog, &params, "CompoundFk", "toCompoundPk = $id").unwrap_err();
        assert!(matches!(
            err,
            TranslationError::JoinPlanning(JoinPlanningError::IncompleteObjectId { .. })
        ));
    }

    #[test]
    fn test_scalar_against_compound_key_is_rejected() {
        let catalog = catalog();
        let params = QueryParameters::default();
        let err = translate(&catalog, &params, "CompoundFk", "toCompoundPk = 3").unwrap_err();
        assert!(matches!(
            err,
            TranslationError::UnsupportedConstruct(UnsupportedConstructError::ValueShape { .. })
        ));
    }

    #[test]
    fn test_null_comparisons() {
        let catalog = catalog();
        let params = QueryParameters::default();
        let node = translate(&catalog, &params, "CompoundFk", "name = null").unwrap();
        assert!(matches!(node, Node::IsNull(ref n) if !n.negated));

        let node = translate(&catalog, &params, "CompoundFk", "toCompoundPk <> null").unwrap();
        match node {
            Node::Operator(op) => {
                assert_eq!(op.op, Operator::Or);
                assert!(op.children.iter().all(|c| matches!(c, Node::IsNull(n) if n.negated)));
            }
            other => panic!("expected OR of IS NOT NULL, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_on_left_is_mirrored() {
        let catalog = catalog();
        let params = QueryParameters::default();
        let node = translate(&catalog, &params, "CompoundFk", "5 < pkey").unwrap();
        match node {
            Node::Operator(op) => {
                assert_eq!(op.op, Operator::Gt);
                assert!(matches!(op.children[0], Node::Column(_)));
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_value_takes_column_type() {
        let catalog = catalog();
        let params = QueryParameters::default();
        let node = translate(&catalog, &params, "CompoundFk", "name = 'x'").unwrap();
        match node {
            Node::Operator(op) => match &op.children[1] {
                Node::Value(v) => assert_eq!(v.jdbc_type, JdbcType::Varchar),
                other => panic!("expected value, got {:?}", other),
            },
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_literals_and_empty_in() {
        let catalog = catalog();
        let params = QueryParameters::default().with_named("none", Value::List(vec![]));
        assert_eq!(translate(&catalog, &params, "CompoundFk", "true").unwrap(), text("1=1"));
        assert_eq!(translate(&catalog, &params, "CompoundFk", "false").unwrap(), text("1=0"));
        assert_eq!(translate(&catalog, &params, "CompoundFk", "pkey in $none").unwrap(), text("1=0"));
        assert_eq!(
            translate(&catalog, &params, "CompoundFk", "pkey not in $none").unwrap(),
            text("1=1")
        );
    }

    #[test]
    fn test_in_values_are_array_bound() {
        let catalog = catalog();
        let params = QueryParameters::default().with_named("ids", vec![1, 2]);
        let node = translate(&catalog, &params, "CompoundFk", "pkey in ($ids, 3)").unwrap();
        match node {
            Node::In(in_node) => match *in_node.list {
                Node::List(items) => {
                    assert_eq!(items.len(), 3);
                    assert!(items.iter().all(|i| matches!(i, Node::Value(v) if v.is_array)));
                }
                other => panic!("expected list, got {:?}", other),
            },
            other => panic!("expected IN, got {:?}", other),
        }
    }

    #[test]
    fn test_unbound_parameter() {
        let catalog = catalog();
        let params = QueryParameters::default();
        let err = translate(&catalog, &params, "CompoundFk", "name = $missing").unwrap_err();
        assert!(matches!(err, TranslationError::TranslationState(_)));
    }

    #[test]
    fn test_unknown_attribute() {
        let catalog = catalog();
        let params = QueryParameters::default();
        let err = translate(&catalog, &params, "CompoundFk", "nickname = 'x'").unwrap_err();
        assert!(matches!(
            err,
            TranslationError::SchemaResolution(SchemaResolutionError::UnknownAttribute { .. })
        ));
    }
}
