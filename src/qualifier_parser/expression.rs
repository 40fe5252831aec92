use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, digit1},
    combinator::{map, opt, recognize},
    error::context,
    multi::separated_list0,
    sequence::{delimited, pair, preceded, separated_pair},
    Parser,
};

use super::ast::{
    ArithmeticOp, ComparisonOp, Expression, PathExpression, PathKind, PathSegment,
};
use super::common::{is_identifier_char, is_reserved_word, keyword, parse_identifier, ws, PResult};
use super::errors::QualifierParsingError;
use crate::sql_ast::Value;

pub fn parse_expression(input: &str) -> PResult<'_, Expression> {
    parse_logical_or(input)
}

fn parse_logical_or(input: &str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_logical_and(input)?;

    let mut remaining_input = input;
    let mut operands = vec![lhs];

    loop {
        let res = preceded(keyword("or"), parse_logical_and).parse(remaining_input);
        match res {
            Ok((new_input, rhs)) => {
                operands.push(rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((remaining_input, Expression::or(operands)))
}

fn parse_logical_and(input: &str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_not_expression(input)?;

    let mut remaining_input = input;
    let mut operands = vec![lhs];

    loop {
        let res = preceded(keyword("and"), parse_not_expression).parse(remaining_input);
        match res {
            Ok((new_input, rhs)) => {
                operands.push(rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((remaining_input, Expression::and(operands)))
}

fn parse_not_expression(input: &str) -> PResult<'_, Expression> {
    alt((
        map(preceded(keyword("not"), parse_not_expression), Expression::negate),
        parse_predicate,
    ))
    .parse(input)
}

fn parse_comparison_op(input: &str) -> PResult<'_, ComparisonOp> {
    ws(alt((
        map(tag(">="), |_| ComparisonOp::Ge),
        map(tag("<="), |_| ComparisonOp::Le),
        map(tag("<>"), |_| ComparisonOp::NotEq),
        map(tag("!="), |_| ComparisonOp::NotEq),
        map(tag("=="), |_| ComparisonOp::Eq),
        map(tag("="), |_| ComparisonOp::Eq),
        map(tag(">"), |_| ComparisonOp::Gt),
        map(tag("<"), |_| ComparisonOp::Lt),
    )))
    .parse(input)
}

/// Postfix predicate forms that may be negated with a leading `not`.
enum PredicateTail {
    Like {
        pattern: Expression,
        ignore_case: bool,
        escape: Option<char>,
    },
    In(Expression),
    Between(Expression, Expression),
}

fn parse_like_tail(input: &str) -> PResult<'_, PredicateTail> {
    let (input, ignore_case) = alt((
        map(keyword("likeIgnoreCase"), |_| true),
        map(keyword("like"), |_| false),
    ))
    .parse(input)?;
    let (input, pattern) = context("like pattern", parse_additive_expression).parse(input)?;
    let (input, escape) = opt(preceded(keyword("escape"), ws(parse_string_literal))).parse(input)?;

    let escape = match escape {
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => {
                    return Err(nom::Err::Failure(QualifierParsingError {
                        errors: vec![(input, "escape must be a single character")],
                    }))
                }
            }
        }
        None => None,
    };

    Ok((
        input,
        PredicateTail::Like {
            pattern,
            ignore_case,
            escape,
        },
    ))
}

fn parse_in_tail(input: &str) -> PResult<'_, PredicateTail> {
    let (input, _) = keyword("in").parse(input)?;
    let (input, list) = context(
        "in list",
        alt((
            map(
                delimited(
                    ws(char('(')),
                    separated_list0(ws(char(',')), parse_additive_expression),
                    ws(char(')')),
                ),
                Expression::List,
            ),
            ws(parse_parameter),
        )),
    )
    .parse(input)?;
    Ok((input, PredicateTail::In(list)))
}

fn parse_between_tail(input: &str) -> PResult<'_, PredicateTail> {
    let (input, _) = keyword("between").parse(input)?;
    let (input, (low, high)) = context(
        "between bounds",
        separated_pair(
            parse_additive_expression,
            keyword("and"),
            parse_additive_expression,
        ),
    )
    .parse(input)?;
    Ok((input, PredicateTail::Between(low, high)))
}

fn parse_predicate(input: &str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_additive_expression(input)?;

    match parse_comparison_op(input) {
        Ok((input, op)) => {
            let (input, rhs) = context("comparison", parse_additive_expression).parse(input)?;
            return Ok((input, Expression::compare(op, lhs, rhs)));
        }
        Err(nom::Err::Error(_)) => {}
        Err(e) => return Err(e),
    }

    let res = pair(
        opt(keyword("not")),
        alt((parse_like_tail, parse_in_tail, parse_between_tail)),
    )
    .parse(input);

    let (input, (negated, tail)) = match res {
        Ok(parsed) => parsed,
        Err(nom::Err::Error(_)) => return Ok((input, lhs)),
        Err(e) => return Err(e),
    };
    let negated = negated.is_some();

    let expr = match tail {
        PredicateTail::Like {
            pattern,
            ignore_case,
            escape,
        } => Expression::Like {
            expr: Box::new(lhs),
            pattern: Box::new(pattern),
            ignore_case,
            negated,
            escape,
        },
        PredicateTail::In(list) => Expression::In {
            expr: Box::new(lhs),
            list: Box::new(list),
            negated,
        },
        PredicateTail::Between(low, high) => Expression::Between {
            expr: Box::new(lhs),
            low: Box::new(low),
            high: Box::new(high),
            negated,
        },
    };
    Ok((input, expr))
}

// Additive operators: + -
fn parse_additive_expression(input: &str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_multiplicative_expression(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        let op_result = ws(alt((
            map(char('+'), |_| ArithmeticOp::Add),
            map(char('-'), |_| ArithmeticOp::Sub),
        )))
        .parse(remaining_input);

        match op_result {
            Ok((new_input, op)) => {
                let (new_input, rhs) = parse_multiplicative_expression(new_input)?;
                final_expression = Expression::Arithmetic {
                    op,
                    lhs: Box::new(final_expression),
                    rhs: Box::new(rhs),
                };
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining_input, final_expression))
}

// Multiplicative operators: * /
fn parse_multiplicative_expression(input: &str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_unary_expression(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        let op_result = ws(alt((
            map(char('*'), |_| ArithmeticOp::Mul),
            map(char('/'), |_| ArithmeticOp::Div),
        )))
        .parse(remaining_input);

        match op_result {
            Ok((new_input, op)) => {
                let (new_input, rhs) = parse_unary_expression(new_input)?;
                final_expression = Expression::Arithmetic {
                    op,
                    lhs: Box::new(final_expression),
                    rhs: Box::new(rhs),
                };
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining_input, final_expression))
}

fn parse_unary_expression(input: &str) -> PResult<'_, Expression> {
    alt((
        map(preceded(ws(char('-')), parse_unary_expression), |expr| match expr {
            Expression::Literal(Value::Int(i)) => Expression::Literal(Value::Int(-i)),
            Expression::Literal(Value::Float(f)) => Expression::Literal(Value::Float(-f)),
            other => Expression::Negate(Box::new(other)),
        }),
        parse_primary_expression,
    ))
    .parse(input)
}

fn parse_primary_expression(input: &str) -> PResult<'_, Expression> {
    alt((
        delimited(ws(char('(')), parse_expression, ws(char(')'))),
        parse_case_expression,
        ws(parse_parameter),
        ws(parse_literal),
        parse_function_call,
        ws(parse_path),
    ))
    .parse(input)
}

fn parse_case_expression(input: &str) -> PResult<'_, Expression> {
    let (input, _) = keyword("case").parse(input)?;

    let mut when_then = Vec::new();
    let mut remaining_input = input;

    loop {
        let res = preceded(
            keyword("when"),
            separated_pair(parse_expression, keyword("then"), parse_expression),
        )
        .parse(remaining_input);

        match res {
            Ok((new_input, (when_expr, then_expr))) => {
                when_then.push((when_expr, then_expr));
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    if when_then.is_empty() {
        return Err(nom::Err::Failure(QualifierParsingError {
            errors: vec![(remaining_input, "case expression requires at least one when")],
        }));
    }

    let (input, else_expr) =
        opt(preceded(keyword("else"), parse_expression)).parse(remaining_input)?;
    let (input, _) = context("case expression", keyword("end")).parse(input)?;

    Ok((
        input,
        Expression::Case {
            when_then,
            else_expr: else_expr.map(Box::new),
        },
    ))
}

/// `$name`, `:name` or `?N`
pub fn parse_parameter<'a>(input: &'a str) -> PResult<'a, Expression> {
    alt((
        map(
            preceded(alt((char('$'), char(':'))), parse_identifier),
            |name: &str| Expression::NamedParameter(name.to_string()),
        ),
        |input: &'a str| -> PResult<'a, Expression> {
            let (rest, digits) = preceded(char('?'), digit1).parse(input)?;
            match digits.parse::<usize>() {
                Ok(index) => Ok((rest, Expression::PositionalParameter(index))),
                Err(_) => Err(nom::Err::Failure(QualifierParsingError {
                    errors: vec![(input, "positional parameter index out of range")],
                })),
            }
        },
    ))
    .parse(input)
}

fn parse_literal(input: &str) -> PResult<'_, Expression> {
    alt((
        map(parse_string_literal, |s| Expression::Literal(Value::String(s))),
        map(parse_double_quoted_string_literal, |s: &str| {
            Expression::Literal(Value::String(s.to_string()))
        }),
        parse_numeric_literal,
        map(keyword("true"), |_| Expression::Literal(Value::Bool(true))),
        map(keyword("false"), |_| Expression::Literal(Value::Bool(false))),
        map(keyword("null"), |_| Expression::Literal(Value::Null)),
    ))
    .parse(input)
}

fn parse_numeric_literal(input: &str) -> PResult<'_, Expression> {
    let (rest, text) = recognize(pair(digit1, opt(pair(char('.'), digit1)))).parse(input)?;
    if rest.starts_with(is_identifier_char) {
        return Err(nom::Err::Error(QualifierParsingError {
            errors: vec![(input, "numeric literal")],
        }));
    }
    if let Ok(i) = text.parse::<i64>() {
        return Ok((rest, Expression::Literal(Value::Int(i))));
    }
    match text.parse::<f64>() {
        Ok(f) => Ok((rest, Expression::Literal(Value::Float(f)))),
        Err(_) => Err(nom::Err::Failure(QualifierParsingError {
            errors: vec![(input, "numeric literal out of range")],
        })),
    }
}

/// Single-quoted string; a doubled quote stands for one quote character.
pub fn parse_string_literal(input: &str) -> PResult<'_, String> {
    let (mut rest, _) = char('\'').parse(input)?;
    let mut out = String::new();
    loop {
        match rest.find('\'') {
            Some(pos) => {
                out.push_str(&rest[..pos]);
                let after = &rest[pos + 1..];
                match after.strip_prefix('\'') {
                    Some(next) => {
                        out.push('\'');
                        rest = next;
                    }
                    None => return Ok((after, out)),
                }
            }
            None => {
                return Err(nom::Err::Failure(QualifierParsingError {
                    errors: vec![(input, "unterminated string literal")],
                }))
            }
        }
    }
}

pub fn parse_double_quoted_string_literal(input: &str) -> PResult<'_, &str> {
    delimited(char('"'), take_until("\""), char('"')).parse(input)
}

pub fn parse_function_call(input: &str) -> PResult<'_, Expression> {
    let (input, name) = ws(parse_identifier).parse(input)?;
    if is_reserved_word(name) {
        return Err(nom::Err::Error(QualifierParsingError {
            errors: vec![(input, "function name")],
        }));
    }
    let (input, _) = ws(char('(')).parse(input)?;

    // count(*) counts rows and takes no arguments
    let star: PResult<'_, char> = ws(char('*')).parse(input);
    if let Ok((rest, _)) = star {
        let (rest, _) = context("function arguments", ws(char(')'))).parse(rest)?;
        return Ok((
            rest,
            Expression::FunctionCall {
                name: name.to_string(),
                args: Vec::new(),
            },
        ));
    }

    let (input, args) = context(
        "function arguments",
        separated_list0(ws(char(',')), parse_expression),
    )
    .parse(input)?;
    let (input, _) = context("function arguments", ws(char(')'))).parse(input)?;

    Ok((
        input,
        Expression::FunctionCall {
            name: name.to_string(),
            args,
        },
    ))
}

fn parse_path_segment(input: &str) -> PResult<'_, PathSegment> {
    let (rest, name) = take_while1(is_identifier_char).parse(input)?;

    // A '+' attached to the segment marks an outer join when it cannot start
    // an arithmetic operand: `toArtist+.artistName`, `paintingArray+ = null`.
    if let Some(after) = rest.strip_prefix('+') {
        let is_outer = match after.chars().next() {
            None | Some('.') | Some(')') | Some(',') => true,
            Some(c) => c.is_whitespace(),
        };
        if is_outer {
            return Ok((
                after,
                PathSegment {
                    name: name.to_string(),
                    outer: true,
                },
            ));
        }
    }

    Ok((rest, PathSegment::new(name)))
}

pub fn parse_path(input: &str) -> PResult<'_, Expression> {
    let (input, db) = opt(tag("db:")).parse(input)?;
    let (input, first) = parse_path_segment(input)?;

    if db.is_none() && (is_reserved_word(&first.name) || first.name.starts_with(|c: char| c.is_ascii_digit())) {
        return Err(nom::Err::Error(QualifierParsingError {
            errors: vec![(input, "path")],
        }));
    }

    let mut segments = vec![first];
    let mut remaining_input = input;
    loop {
        match preceded(char('.'), parse_path_segment).parse(remaining_input) {
            Ok((new_input, segment)) => {
                segments.push(segment);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((
        remaining_input,
        Expression::Path(PathExpression {
            kind: if db.is_some() {
                PathKind::Db
            } else {
                PathKind::Object
            },
            root_var: None,
            segments,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Expression {
        let (rest, expr) = parse_expression(input).unwrap();
        assert_eq!(rest, "", "unparsed input for {}", input);
        expr
    }

    #[test]
    fn test_precedence_and_binds_tighter_than_or() {
        let expr = parse("a = 1 or b = 2 and c = 3");
        match expr {
            Expression::Or(operands) => {
                assert_eq!(operands.len(), 2);
                assert!(matches!(operands[1], Expression::And(_)));
            }
            other => panic!("expected OR, got {:?}", other),
        }
    }

    #[test]
    fn test_or_does_not_match_prefix_of_identifier() {
        let expr = parse("ordinal = 1");
        assert!(matches!(expr, Expression::Comparison { .. }));
    }

    #[test]
    fn test_not_like_with_escape() {
        let expr = parse("artistName not likeIgnoreCase 'a!%' escape '!'");
        assert_eq!(
            expr,
            Expression::Like {
                expr: Box::new(Expression::path("artistName")),
                pattern: Box::new(Expression::literal("a!%")),
                ignore_case: true,
                negated: true,
                escape: Some('!'),
            }
        );
    }

    #[test]
    fn test_between_consumes_its_and() {
        let expr = parse("estimatedPrice between 1 and 10 and paintingTitle = 'x'");
        match expr {
            Expression::And(operands) => {
                assert!(matches!(operands[0], Expression::Between { negated: false, .. }));
                assert!(matches!(operands[1], Expression::Comparison { .. }));
            }
            other => panic!("expected AND, got {:?}", other),
        }
    }

    #[test]
    fn test_in_list_and_parameter() {
        let expr = parse("paintingTitle in ('a', 'b')");
        match expr {
            Expression::In { list, negated, .. } => {
                assert!(!negated);
                assert_eq!(
                    *list,
                    Expression::List(vec![Expression::literal("a"), Expression::literal("b")])
                );
            }
            other => panic!("expected IN, got {:?}", other),
        }

        let expr = parse("paintingTitle not in $titles");
        assert!(matches!(expr, Expression::In { negated: true, .. }));

        let expr = parse("paintingTitle in ()");
        match expr {
            Expression::In { list, .. } => assert_eq!(*list, Expression::List(vec![])),
            other => panic!("expected IN, got {:?}", other),
        }
    }

    #[test]
    fn test_parameters() {
        assert_eq!(parse("$name"), Expression::param("name"));
        assert_eq!(parse(":name"), Expression::param("name"));
        assert_eq!(parse("?2"), Expression::PositionalParameter(2));
    }

    #[test]
    fn test_outer_join_marker_and_arithmetic() {
        let expr = parse("toArtist+.artistName = 'x'");
        match expr {
            Expression::Comparison { lhs, .. } => match *lhs {
                Expression::Path(path) => assert!(path.segments[0].outer),
                other => panic!("expected path, got {:?}", other),
            },
            other => panic!("expected comparison, got {:?}", other),
        }

        let expr = parse("estimatedPrice + 10 > 100");
        match expr {
            Expression::Comparison { lhs, .. } => {
                assert!(matches!(*lhs, Expression::Arithmetic { op: ArithmeticOp::Add, .. }))
            }
            other => panic!("expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_db_path() {
        match parse("db:toArtist.ARTIST_NAME") {
            Expression::Path(path) => {
                assert_eq!(path.kind, PathKind::Db);
                assert_eq!(path.segments.len(), 2);
            }
            other => panic!("expected path, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_literal_folds() {
        assert_eq!(parse("-5"), Expression::literal(-5i64));
        assert!(matches!(parse("-estimatedPrice"), Expression::Negate(_)));
    }

    #[test]
    fn test_string_literal_quote_escape() {
        assert_eq!(parse("'it''s'"), Expression::literal("it's"));
        assert_eq!(parse("\"double\""), Expression::literal("double"));
        assert!(matches!(
            parse_expression("'open"),
            Err(nom::Err::Failure(_))
        ));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            parse("count(*)"),
            Expression::FunctionCall {
                name: "count".to_string(),
                args: vec![],
            }
        );
        assert_eq!(
            parse("upper(artistName)"),
            Expression::FunctionCall {
                name: "upper".to_string(),
                args: vec![Expression::path("artistName")],
            }
        );
    }

    #[test]
    fn test_case_expression() {
        let expr = parse("case when estimatedPrice > 10 then 'high' else 'low' end");
        match expr {
            Expression::Case {
                when_then,
                else_expr,
            } => {
                assert_eq!(when_then.len(), 1);
                assert_eq!(else_expr.as_deref(), Some(&Expression::literal("low")));
            }
            other => panic!("expected CASE, got {:?}", other),
        }
    }

    #[test]
    fn test_not_prefix() {
        let expr = parse("not artistName = 'a'");
        assert!(matches!(expr, Expression::Not(_)));
        // a path starting with "not" is still a path
        assert!(matches!(parse("notes = 1"), Expression::Comparison { .. }));
    }
}
