//! Database dialects.
//!
//! A dialect never sees the translation context. It contributes:
//! - a [`RewriteRegistry`] of pure node rewrites, applied by [`process`]
//! - the pagination form for `LIMIT`/`OFFSET` requests
//! - identifier quote characters for its [`QuotingStrategy`]
//!
//! Supported dialects:
//! - `generic` - ANSI-flavoured SQL, the default
//! - `postgres` - native `ILIKE`, `EXTRACT(DOW ...)`
//! - `mysql` - backtick quoting, `YEAR(x)` style date parts
//! - `sqlserver` - bracket quoting, `OFFSET .. FETCH`, `CHARINDEX`, `DATEPART`

pub mod generic;
pub mod mysql;
pub mod postgres;
pub mod processor;
pub mod quoting;
pub mod rules;
pub mod sqlserver;

pub use processor::{process, RewriteFn, RewriteRegistry};
pub use quoting::{DelimitedQuoting, NoQuoting, QuotingStrategy};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::sql_ast::{PaginationNode, PaginationStyle};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DialectType {
    #[default]
    Generic,
    Postgres,
    MySql,
    SqlServer,
    /// A dialect registered at runtime under its own name.
    Custom(String),
}

impl DialectType {
    pub fn as_str(&self) -> &str {
        match self {
            DialectType::Generic => "generic",
            DialectType::Postgres => "postgres",
            DialectType::MySql => "mysql",
            DialectType::SqlServer => "sqlserver",
            DialectType::Custom(name) => name,
        }
    }
}

impl fmt::Display for DialectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Ok(match name.as_str() {
            "" => return Err("Dialect name cannot be empty".to_string()),
            "generic" | "sql" => DialectType::Generic,
            "postgres" | "postgresql" => DialectType::Postgres,
            "mysql" => DialectType::MySql,
            "sqlserver" | "mssql" => DialectType::SqlServer,
            _ => DialectType::Custom(name),
        })
    }
}

impl TryFrom<String> for DialectType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DialectType> for String {
    fn from(value: DialectType) -> Self {
        value.as_str().to_string()
    }
}

pub trait Dialect: Send + Sync + fmt::Debug {
    fn dialect_type(&self) -> DialectType;

    fn rewrites(&self) -> &RewriteRegistry;

    /// Pagination form for a `LIMIT`/`OFFSET` request.
    fn paginate(&self, limit: Option<u64>, offset: Option<u64>) -> PaginationNode {
        PaginationNode {
            style: PaginationStyle::LimitOffset,
            limit,
            offset,
        }
    }

    /// Opening and closing identifier quotes.
    fn identifier_quotes(&self) -> (&'static str, &'static str) {
        ("\"", "\"")
    }

    fn quoting_strategy(&self, quote_identifiers: bool) -> Box<dyn QuotingStrategy> {
        if quote_identifiers {
            let (open, close) = self.identifier_quotes();
            Box::new(DelimitedQuoting::new(open, close))
        } else {
            Box::new(NoQuoting)
        }
    }
}

/// Registry of available dialects
pub struct DialectRegistry {
    dialects: HashMap<DialectType, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    /// Create a registry with all built-in dialects registered
    pub fn new() -> Self {
        let mut registry = Self {
            dialects: HashMap::new(),
        };
        registry.register(Arc::new(generic::GenericDialect::new()));
        registry.register(Arc::new(postgres::PostgresDialect::new()));
        registry.register(Arc::new(mysql::MySqlDialect::new()));
        registry.register(Arc::new(sqlserver::SqlServerDialect::new()));
        registry
    }

    /// Register a dialect under its own type, replacing any previous one
    pub fn register(&mut self, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(dialect.dialect_type(), dialect);
    }

    pub fn get(&self, dialect_type: &DialectType) -> Option<Arc<dyn Dialect>> {
        self.dialects.get(dialect_type).cloned()
    }

    pub fn contains(&self, dialect_type: &DialectType) -> bool {
        self.dialects.contains_key(dialect_type)
    }

    /// Registered dialect names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(|d| d.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.names())
            .finish()
    }
}
