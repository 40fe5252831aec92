use nom::error::{ContextError, ParseError};
use std::fmt;
use thiserror::Error;

/// nom error type collecting the failing input positions with a context label.
#[derive(Debug, PartialEq)]
pub struct QualifierParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> ParseError<&'a str> for QualifierParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        QualifierParsingError {
            errors: vec![(input, "unexpected input")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unexpected input (appended)"));
        other
    }
}

impl<'a> ContextError<&'a str> for QualifierParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for QualifierParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {:}", ctx, input)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for QualifierParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        QualifierParsingError {
            errors: vec![(err.input, "Unable to parse")],
        }
    }
}

/// Owned parse failure returned from [`super::parse_qualifier`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QualifierParseError {
    #[error("Empty qualifier")]
    Empty,
    #[error("Syntax error at offset {offset}: {context} near `{near}`")]
    Syntax {
        offset: usize,
        context: String,
        near: String,
    },
    #[error("Unexpected trailing input at offset {offset}: `{remaining}`")]
    TrailingInput { offset: usize, remaining: String },
}

impl QualifierParseError {
    /// Converts a nom error into an owned error, locating the innermost
    /// failure relative to the full `source` text.
    pub fn from_parsing_error(source: &str, err: &QualifierParsingError<'_>) -> Self {
        // The first recorded entry is the innermost failure; the last context
        // label added is the most descriptive one.
        let (input, _) = err.errors.first().copied().unwrap_or((source, "unexpected input"));
        let context = err
            .errors
            .iter()
            .rev()
            .find(|(_, ctx)| !ctx.starts_with("unexpected input"))
            .map(|(_, ctx)| *ctx)
            .unwrap_or("unexpected input");
        QualifierParseError::Syntax {
            offset: source.len().saturating_sub(input.len()),
            context: context.to_string(),
            near: input.chars().take(20).collect(),
        }
    }
}
