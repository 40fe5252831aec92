//! Rewrite helpers shared by the built-in dialects.

use crate::sql_ast::builder::{exp, function, text};
use crate::sql_ast::{
    ArgStyle, DatePart, ExtractNode, FunctionNode, LikeNode, Node, Operator, PaginationNode, PaginationStyle,
};
use crate::translator::errors::{TranslationError, UnsupportedConstructError};

/// `x LIKE p` with `ignore_case` becomes `UPPER(x) LIKE UPPER(p)`.
pub fn upper_like(like: &LikeNode) -> Option<Node> {
    if !like.ignore_case {
        return None;
    }
    Some(Node::Like(LikeNode {
        expr: Box::new(function("UPPER").arg((*like.expr).clone()).build()),
        pattern: Box::new(function("UPPER").arg((*like.pattern).clone()).build()),
        ignore_case: false,
        negated: like.negated,
        escape: like.escape,
    }))
}

/// Date parts without a standard `EXTRACT` keyword use the `WEEK`, `DOY`
/// and `DOW` fields. `DOW` counts from Sunday = 0 and is shifted to start at 1.
pub fn field_extract(extract: &ExtractNode) -> Option<Node> {
    let field = match extract.part {
        DatePart::Week => "WEEK",
        DatePart::DayOfYear => "DOY",
        DatePart::DayOfWeek => "DOW",
        _ => return None,
    };

    let extracted = function("EXTRACT")
        .arg(text(field))
        .arg((*extract.expr).clone())
        .style(ArgStyle::Keyword("FROM".to_string()))
        .build();
    if extract.part == DatePart::DayOfWeek {
        return Some(exp(extracted).op(Operator::Add, text("1")).build());
    }
    Some(extracted)
}

/// `x LIKE p` with `ignore_case` becomes native `x ILIKE p`.
pub fn native_ilike(like: &LikeNode) -> Option<Node> {
    if !like.ignore_case {
        return None;
    }
    Some(Node::ILike(LikeNode {
        ignore_case: false,
        ..like.clone()
    }))
}

/// `LOCATE(needle, haystack)` becomes `POSITION(needle IN haystack)`. The
/// three argument form has no standard equivalent.
pub fn locate_to_position(dialect: &str, locate: &FunctionNode) -> Result<Node, TranslationError> {
    if locate.args.len() != 2 {
        return Err(UnsupportedConstructError::DialectLimitation {
            dialect: dialect.to_string(),
            construct: "LOCATE with a start position".to_string(),
        }
        .into());
    }
    Ok(function("POSITION")
        .args(locate.args.iter().cloned())
        .style(ArgStyle::Keyword("IN".to_string()))
        .build())
}

/// Same function with a different name, arguments untouched.
pub fn rename_function(function: &FunctionNode, name: &str) -> Node {
    Node::Function(FunctionNode {
        name: name.to_string(),
        ..function.clone()
    })
}

/// `CAST(expr AS type)`
pub fn cast(expr: Node, sql_type: &str) -> Node {
    function("CAST")
        .arg(expr)
        .arg(text(sql_type))
        .style(ArgStyle::Keyword("AS".to_string()))
        .build()
}

/// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`, the offset defaulting to zero.
pub fn offset_fetch(limit: Option<u64>, offset: Option<u64>) -> PaginationNode {
    PaginationNode {
        style: PaginationStyle::OffsetFetch,
        limit,
        offset: Some(offset.unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_ast::builder::{column, exp, value};

    fn like(ignore_case: bool) -> LikeNode {
        match exp(column("NAME")).like(value("a%")).ignore_case(ignore_case).build() {
            Node::Like(like) => like,
            other => panic!("expected LIKE, got {:?}", other),
        }
    }

    #[test]
    fn test_upper_like() {
        assert!(upper_like(&like(false)).is_none());
        match upper_like(&like(true)) {
            Some(Node::Like(rewritten)) => {
                assert!(!rewritten.ignore_case);
                assert!(matches!(&*rewritten.expr, Node::Function(f) if f.name == "UPPER"));
                assert!(matches!(&*rewritten.pattern, Node::Function(f) if f.name == "UPPER"));
            }
            other => panic!("expected LIKE, got {:?}", other),
        }
    }

    #[test]
    fn test_native_ilike() {
        assert!(matches!(native_ilike(&like(true)), Some(Node::ILike(l)) if !l.ignore_case));
        assert!(native_ilike(&like(false)).is_none());
    }

    #[test]
    fn test_locate_to_position() {
        let locate = FunctionNode {
            name: "LOCATE".to_string(),
            args: vec![value("a").build(), column("NAME").build()],
            style: ArgStyle::Comma,
            aggregate: false,
        };
        match locate_to_position("generic", &locate).unwrap() {
            Node::Function(f) => {
                assert_eq!(f.name, "POSITION");
                assert_eq!(f.style, ArgStyle::Keyword("IN".to_string()));
            }
            other => panic!("expected function, got {:?}", other),
        }

        let mut with_start = locate.clone();
        with_start.args.push(value(2).build());
        assert!(matches!(
            locate_to_position("generic", &with_start),
            Err(TranslationError::UnsupportedConstruct(
                UnsupportedConstructError::DialectLimitation { .. }
            ))
        ));
    }

    #[test]
    fn test_offset_fetch_defaults_offset() {
        let page = offset_fetch(Some(5), None);
        assert_eq!(page.style, PaginationStyle::OffsetFetch);
        assert_eq!(page.offset, Some(0));
    }
}
