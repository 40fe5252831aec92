//! Parser for the textual qualifier language, e.g.
//! `toArtist.artistName like 'a%' and estimatedPrice > $minPrice`.

use nom::character::complete::multispace0;
use nom::Parser;

pub mod ast;
mod common;
pub mod errors;
mod expression;

pub use ast::{ArithmeticOp, ComparisonOp, Expression, PathExpression, PathKind, PathSegment};
pub use errors::QualifierParseError;

/// Parses a complete qualifier; trailing input is an error.
pub fn parse_qualifier(input: &str) -> Result<Expression, QualifierParseError> {
    if input.trim().is_empty() {
        return Err(QualifierParseError::Empty);
    }

    let result = expression::parse_expression(input)
        .and_then(|(rest, expr)| multispace0.parse(rest).map(|(rest, _)| (rest, expr)));

    match result {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => Err(QualifierParseError::TrailingInput {
            offset: input.len() - rest.len(),
            remaining: rest.to_string(),
        }),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(QualifierParseError::from_parsing_error(input, &e))
        }
        Err(nom::Err::Incomplete(_)) => Err(QualifierParseError::Syntax {
            offset: input.len(),
            context: "incomplete input".to_string(),
            near: String::new(),
        }),
    }
}

/// Parses a single path such as `toArtist.artistName` or `db:ARTIST_ID`.
pub fn parse_path(input: &str) -> Result<PathExpression, QualifierParseError> {
    match parse_qualifier(input)? {
        Expression::Path(path) => Ok(path),
        _ => Err(QualifierParseError::Syntax {
            offset: 0,
            context: "expected a path".to_string(),
            near: input.chars().take(20).collect(),
        }),
    }
}
