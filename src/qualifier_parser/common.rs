use nom::{
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{multispace0, satisfy},
    combinator::{not, peek},
    error::ParseError,
    sequence::{delimited, terminated},
    IResult, Parser,
};

use super::errors::QualifierParsingError;

pub type PResult<'a, O> = IResult<&'a str, O, QualifierParsingError<'a>>;

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Case-insensitive keyword that must not run into an identifier, so `or`
/// does not match the start of `order`.
pub fn keyword<'a, E: ParseError<&'a str>>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = E> {
    ws(terminated(
        tag_no_case(kw),
        not(peek(satisfy(is_identifier_char))),
    ))
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn parse_identifier(input: &str) -> PResult<'_, &str> {
    take_while1(is_identifier_char).parse(input)
}

/// Words that cannot start a path.
pub fn is_reserved_word(s: &str) -> bool {
    const RESERVED: &[&str] = &[
        "and",
        "or",
        "not",
        "like",
        "likeignorecase",
        "in",
        "between",
        "escape",
        "case",
        "when",
        "then",
        "else",
        "end",
        "true",
        "false",
        "null",
    ];
    let lower = s.to_lowercase();
    RESERVED.contains(&lower.as_str())
}
