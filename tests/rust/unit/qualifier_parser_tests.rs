use relsql::qualifier_parser::{
    parse_path, parse_qualifier, ArithmeticOp, ComparisonOp, Expression, PathKind,
    QualifierParseError,
};
use relsql::sql_ast::Value;
use test_case::test_case;

#[test_case("a = 1", ComparisonOp::Eq ; "equals")]
#[test_case("a == 1", ComparisonOp::Eq ; "double equals")]
#[test_case("a <> 1", ComparisonOp::NotEq ; "not equals")]
#[test_case("a != 1", ComparisonOp::NotEq ; "bang equals")]
#[test_case("a >= 1", ComparisonOp::Ge ; "greater or equal")]
#[test_case("a < 1", ComparisonOp::Lt ; "less than")]
fn test_comparison_operators(input: &str, expected: ComparisonOp) {
    match parse_qualifier(input).unwrap() {
        Expression::Comparison { op, .. } => assert_eq!(op, expected),
        other => panic!("expected comparison for '{}', got {:?}", input, other),
    }
}

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = parse_qualifier("a = 1 or b = 2 and c = 3").unwrap();
    match expr {
        Expression::Or(operands) => {
            assert_eq!(operands.len(), 2);
            assert!(matches!(operands[1], Expression::And(ref inner) if inner.len() == 2));
        }
        other => panic!("expected OR at the top, got {:?}", other),
    }
}

#[test]
fn test_parameters_and_literals() {
    let expr = parse_qualifier("name = $name and id = ?1 and title = 'It''s' and flag = true").unwrap();
    let Expression::And(operands) = expr else {
        panic!("expected AND");
    };
    let rhs: Vec<&Expression> = operands
        .iter()
        .map(|op| match op {
            Expression::Comparison { rhs, .. } => rhs.as_ref(),
            other => panic!("expected comparison, got {:?}", other),
        })
        .collect();
    assert_eq!(rhs[0], &Expression::NamedParameter("name".to_string()));
    assert_eq!(rhs[1], &Expression::PositionalParameter(1));
    assert_eq!(rhs[2], &Expression::Literal(Value::String("It's".to_string())));
    assert_eq!(rhs[3], &Expression::Literal(Value::Bool(true)));
}

#[test]
fn test_like_variants() {
    match parse_qualifier("artistName not likeIgnoreCase 'a%'").unwrap() {
        Expression::Like {
            ignore_case,
            negated,
            ..
        } => assert!(ignore_case && negated),
        other => panic!("expected LIKE, got {:?}", other),
    }
}

#[test]
fn test_arithmetic_precedence() {
    match parse_qualifier("price + tax * 2 > 10").unwrap() {
        Expression::Comparison { lhs, .. } => match *lhs {
            Expression::Arithmetic { op, rhs, .. } => {
                assert_eq!(op, ArithmeticOp::Add);
                assert!(matches!(*rhs, Expression::Arithmetic { op: ArithmeticOp::Mul, .. }));
            }
            other => panic!("expected addition, got {:?}", other),
        },
        other => panic!("expected comparison, got {:?}", other),
    }
}

#[test]
fn test_paths() {
    let path = parse_path("toArtist+.artistName").unwrap();
    assert_eq!(path.kind, PathKind::Object);
    assert!(path.segments[0].outer);
    assert!(!path.segments[1].outer);

    let db = parse_path("db:ARTIST_ID").unwrap();
    assert_eq!(db.kind, PathKind::Db);
    assert_eq!(db.segments[0].name, "ARTIST_ID");
}

#[test]
fn test_in_and_between() {
    assert!(matches!(
        parse_qualifier("id in (1, 2, 3)").unwrap(),
        Expression::In { negated: false, .. }
    ));
    assert!(matches!(
        parse_qualifier("price not between 1 and 5").unwrap(),
        Expression::Between { negated: true, .. }
    ));
}

#[test]
fn test_parse_errors() {
    assert!(matches!(parse_qualifier("   "), Err(QualifierParseError::Empty)));
    assert!(matches!(
        parse_qualifier("a = 1 )"),
        Err(QualifierParseError::TrailingInput { .. })
    ));
    assert!(parse_qualifier("a = ").is_err());
    assert!(parse_qualifier("and = 1").is_err());
}
