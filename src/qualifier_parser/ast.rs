use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sql_ast::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::NotEq => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathKind {
    /// Attributes and relationships of the object model
    Object,
    /// Raw columns and relationships, written with a `db:` prefix
    Db,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    pub name: String,
    /// `+` suffix: traverse with an outer join
    pub outer: bool,
}

impl PathSegment {
    pub fn new(name: impl Into<String>) -> Self {
        PathSegment {
            name: name.into(),
            outer: false,
        }
    }
}

/// A dotted path. The root variable compares case-insensitively, the
/// segments are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathExpression {
    pub kind: PathKind,
    pub root_var: Option<String>,
    pub segments: Vec<PathSegment>,
}

impl PathExpression {
    pub fn with_root(mut self, root_var: impl Into<String>) -> Self {
        self.root_var = Some(root_var.into());
        self
    }

    pub fn last_segment(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

impl FromStr for PathExpression {
    type Err = String;

    /// Parses `toArtist+.artistName` or `db:ARTIST_ID` style paths.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = match s.trim().strip_prefix("db:") {
            Some(rest) => (PathKind::Db, rest),
            None => (PathKind::Object, s.trim()),
        };

        let mut segments = Vec::new();
        for raw in rest.split('.') {
            let (name, outer) = match raw.strip_suffix('+') {
                Some(name) => (name, true),
                None => (raw, false),
            };
            if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(format!("Invalid path segment '{}' in '{}'", raw, s));
            }
            segments.push(PathSegment {
                name: name.to_string(),
                outer,
            });
        }

        Ok(PathExpression {
            kind,
            root_var: None,
            segments,
        })
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == PathKind::Db {
            write!(f, "db:")?;
        }
        if let Some(root) = &self.root_var {
            write!(f, "{}.", root)?;
        }
        let rendered: Vec<String> = self
            .segments
            .iter()
            .map(|s| {
                if s.outer {
                    format!("{}+", s.name)
                } else {
                    s.name.clone()
                }
            })
            .collect();
        write!(f, "{}", rendered.join("."))
    }
}

/// Source expression tree: the filter or qualifier that gets translated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    And(Vec<Expression>),
    Or(Vec<Expression>),
    Not(Box<Expression>),
    Comparison {
        op: ComparisonOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Like {
        expr: Box<Expression>,
        pattern: Box<Expression>,
        ignore_case: bool,
        negated: bool,
        escape: Option<char>,
    },
    In {
        expr: Box<Expression>,
        list: Box<Expression>,
        negated: bool,
    },
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },
    Arithmetic {
        op: ArithmeticOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Negate(Box<Expression>),
    Path(PathExpression),
    Literal(Value),
    NamedParameter(String),
    /// 1-based, as written (`?1`)
    PositionalParameter(usize),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    List(Vec<Expression>),
    Case {
        when_then: Vec<(Expression, Expression)>,
        else_expr: Option<Box<Expression>>,
    },
}

impl Expression {
    /// Object path from dotted notation. Invalid paths still produce a path
    /// expression so that the translator reports them as schema errors.
    pub fn path(path: &str) -> Expression {
        let parsed = path.parse::<PathExpression>().unwrap_or_else(|_| PathExpression {
            kind: PathKind::Object,
            root_var: None,
            segments: vec![PathSegment::new(path)],
        });
        Expression::Path(parsed)
    }

    pub fn literal(value: impl Into<Value>) -> Expression {
        Expression::Literal(value.into())
    }

    pub fn param(name: impl Into<String>) -> Expression {
        Expression::NamedParameter(name.into())
    }

    pub fn compare(op: ComparisonOp, lhs: Expression, rhs: Expression) -> Expression {
        Expression::Comparison {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Conjunction that flattens nested ANDs and unwraps a single operand.
    pub fn and(operands: Vec<Expression>) -> Expression {
        Self::connective(operands, true)
    }

    pub fn or(operands: Vec<Expression>) -> Expression {
        Self::connective(operands, false)
    }

    fn connective(operands: Vec<Expression>, is_and: bool) -> Expression {
        let mut flat = Vec::with_capacity(operands.len());
        for operand in operands {
            match (operand, is_and) {
                (Expression::And(inner), true) | (Expression::Or(inner), false) => {
                    flat.extend(inner)
                }
                (other, _) => flat.push(other),
            }
        }
        if flat.len() == 1 {
            return flat.remove(0);
        }
        if is_and {
            Expression::And(flat)
        } else {
            Expression::Or(flat)
        }
    }

    pub fn negate(self) -> Expression {
        Expression::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_from_str() {
        let path: PathExpression = "toArtist+.artistName".parse().unwrap();
        assert_eq!(path.kind, PathKind::Object);
        assert_eq!(path.segments.len(), 2);
        assert!(path.segments[0].outer);
        assert!(!path.segments[1].outer);
        assert_eq!(path.to_string(), "toArtist+.artistName");

        let db: PathExpression = "db:toArtist.ARTIST_NAME".parse().unwrap();
        assert_eq!(db.kind, PathKind::Db);
        assert_eq!(db.to_string(), "db:toArtist.ARTIST_NAME");

        assert!("toArtist..artistName".parse::<PathExpression>().is_err());
    }

    #[test]
    fn test_and_flattens() {
        let a = Expression::path("a");
        let b = Expression::path("b");
        let c = Expression::path("c");
        let nested = Expression::and(vec![Expression::and(vec![a.clone(), b.clone()]), c.clone()]);
        assert_eq!(nested, Expression::And(vec![a.clone(), b, c]));
        assert_eq!(Expression::or(vec![a.clone()]), a);
    }
}
