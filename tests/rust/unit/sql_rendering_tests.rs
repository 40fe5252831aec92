use relsql::dialect::{process, DelimitedQuoting, DialectRegistry, DialectType, NoQuoting};
use relsql::sql_ast::builder::{column, exp, function, join, select, table, value};
use relsql::sql_ast::{JdbcType, JoinKind, Node, Operator, Value};
use relsql::sql_generator::{expand_key_comparison, render, TableAliasPolicy};
use relsql::translator::{TranslationError, UnsupportedConstructError};

fn plain(node: &Node) -> String {
    render(node, &NoQuoting, TableAliasPolicy::WhenJoined).unwrap().sql
}

fn artist_select() -> Node {
    select()
        .column(column("ARTIST_NAME").table("t0"))
        .from(table("ARTIST").alias("t0"))
        .where_(exp(column("ARTIST_ID").table("t0")).eq(value(5)))
        .build()
}

#[test]
fn test_single_table_select_drops_aliases() {
    let rendered = render(&artist_select(), &NoQuoting, TableAliasPolicy::WhenJoined).unwrap();
    assert_eq!(rendered.sql, "SELECT ARTIST_NAME FROM ARTIST WHERE ARTIST_ID = ?");
    assert_eq!(rendered.bindings.len(), 1);
    assert_eq!(rendered.bindings[0].value, Value::Int(5));
}

#[test]
fn test_always_policy_keeps_aliases() {
    let rendered = render(&artist_select(), &NoQuoting, TableAliasPolicy::Always).unwrap();
    assert_eq!(rendered.sql, "SELECT t0.ARTIST_NAME FROM ARTIST t0 WHERE t0.ARTIST_ID = ?");
}

#[test]
fn test_joined_select_with_quoting() {
    let node = select()
        .column(column("PAINTING_TITLE").table("t0"))
        .from(table("PAINTING").alias("t0"))
        .join(
            join(JoinKind::Left, table("ARTIST").alias("t1"))
                .on(exp(column("ARTIST_ID").table("t0")).eq(column("ARTIST_ID").table("t1"))),
        )
        .build();
    let rendered = render(&node, &DelimitedQuoting::new("[", "]"), TableAliasPolicy::WhenJoined).unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT [t0].[PAINTING_TITLE] FROM [PAINTING] [t0] LEFT JOIN [ARTIST] [t1] ON [t0].[ARTIST_ID] = [t1].[ARTIST_ID]"
    );
}

#[test]
fn test_parentheses_follow_precedence() {
    let or = exp(column("A")).eq(value(1)).or(exp(column("B")).eq(value(2)));
    let node = exp(or).and(exp(column("C")).eq(value(3))).build();
    assert_eq!(plain(&node), "(A = ? OR B = ?) AND C = ?");

    let right_nested = exp(column("A"))
        .op(Operator::Sub, exp(column("B")).op(Operator::Sub, column("C")))
        .build();
    assert_eq!(plain(&right_nested), "A - (B - C)");

    let left_nested = exp(exp(column("A")).op(Operator::Sub, column("B")))
        .op(Operator::Sub, column("C"))
        .build();
    assert_eq!(plain(&left_nested), "A - B - C");
}

#[test]
fn test_compound_key_expansion() {
    let pairs = || {
        vec![
            (column("F_KEY1").build(), value(3).jdbc_type(JdbcType::Integer).build()),
            (column("F_KEY2").build(), value("aaa").jdbc_type(JdbcType::Varchar).build()),
        ]
    };

    let eq = expand_key_comparison(Operator::Eq, pairs()).unwrap();
    let rendered = render(&eq, &NoQuoting, TableAliasPolicy::WhenJoined).unwrap();
    assert_eq!(rendered.sql, "F_KEY1 = ? AND F_KEY2 = ?");
    assert_eq!(
        rendered.binding_values(),
        vec![&Value::Int(3), &Value::String("aaa".to_string())]
    );

    let ne = expand_key_comparison(Operator::NotEq, pairs()).unwrap();
    assert_eq!(plain(&ne), "F_KEY1 <> ? OR F_KEY2 <> ?");
}

#[test]
fn test_unprocessed_constructs_are_rejected() {
    let like = exp(column("NAME")).like(value("a%")).ignore_case(true).build();
    assert!(matches!(
        render(&like, &NoQuoting, TableAliasPolicy::WhenJoined),
        Err(TranslationError::UnsupportedConstruct(
            UnsupportedConstructError::RequiresDialectRewrite { .. }
        ))
    ));

    let paged = select().from(table("ARTIST")).limit_offset(Some(1), None).build();
    assert!(render(&paged, &NoQuoting, TableAliasPolicy::WhenJoined).is_err());
}

#[test]
fn test_postgres_processing_then_rendering() {
    let registry = DialectRegistry::new();
    let postgres = registry.get(&DialectType::Postgres).unwrap();
    let node = select()
        .from(table("ARTIST"))
        .where_(
            exp(function("LOCATE").arg(value("a")).arg(column("ARTIST_NAME")))
                .gt(value(0)),
        )
        .limit_offset(Some(10), Some(0))
        .build();

    let processed = process(postgres.as_ref(), node).unwrap();
    assert_eq!(
        plain(&processed),
        "SELECT * FROM ARTIST WHERE POSITION(? IN ARTIST_NAME) > ? LIMIT 10 OFFSET 0"
    );
}
