//! Identifier quoting.
//!
//! The renderer passes every table name, column name and alias through a
//! [`QuotingStrategy`]. Qualified names are quoted per dotted part, so
//! `t0.ARTIST_NAME` becomes `"t0"."ARTIST_NAME"`.

pub trait QuotingStrategy: Send + Sync {
    fn quote(&self, identifier: &str) -> String;
}

/// Emits identifiers unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuoting;

impl QuotingStrategy for NoQuoting {
    fn quote(&self, identifier: &str) -> String {
        identifier.to_string()
    }
}

/// Wraps each part of an identifier in `open`/`close`, doubling any embedded
/// closing delimiter.
#[derive(Debug, Clone)]
pub struct DelimitedQuoting {
    open: String,
    close: String,
}

impl DelimitedQuoting {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    fn quote_part(&self, part: &str) -> String {
        let escaped = part.replace(&self.close, &format!("{0}{0}", self.close));
        format!("{}{}{}", self.open, escaped, self.close)
    }
}

impl QuotingStrategy for DelimitedQuoting {
    fn quote(&self, identifier: &str) -> String {
        identifier
            .split('.')
            .map(|part| self.quote_part(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}
