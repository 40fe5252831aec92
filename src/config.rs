use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::dialect::DialectType;
use crate::sql_generator::TableAliasPolicy;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Translator configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Target SQL dialect
    pub dialect: DialectType,

    /// Quote every identifier with the dialect's delimiters
    pub quote_identifiers: bool,

    /// When columns are qualified with table aliases
    pub table_aliases: TableAliasPolicy,

    /// Prefix for generated table aliases (`t0`, `t1`, ...)
    #[validate(
        length(min = 1, max = 8, message = "Alias prefix must be 1 to 8 characters"),
        custom(function = "validate_alias_prefix")
    )]
    pub alias_prefix: String,

    /// Add DISTINCT when a to-many relationship is joined
    pub force_distinct_on_to_many: bool,

    /// Whether finished translations are cached
    pub cache_enabled: bool,

    /// Maximum cached translations (1-100000)
    #[validate(range(
        min = 1,
        max = 100000,
        message = "Cache size must be between 1 and 100000"
    ))]
    pub cache_max_entries: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            dialect: DialectType::Generic,
            quote_identifiers: false,
            table_aliases: TableAliasPolicy::WhenJoined,
            alias_prefix: "t".to_string(),
            force_distinct_on_to_many: true,
            cache_enabled: true,
            cache_max_entries: 1000,
        }
    }
}

impl TranslatorConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            dialect: parse_with("RELSQL_DIALECT", "generic", str::parse::<DialectType>)?,
            quote_identifiers: parse_env_var("RELSQL_QUOTE_IDENTIFIERS", "false")?,
            table_aliases: parse_with("RELSQL_TABLE_ALIASES", "when_joined", str::parse::<TableAliasPolicy>)?,
            alias_prefix: env::var("RELSQL_ALIAS_PREFIX").unwrap_or_else(|_| "t".to_string()),
            force_distinct_on_to_many: parse_env_var("RELSQL_FORCE_DISTINCT_ON_TO_MANY", "true")?,
            cache_enabled: parse_env_var("RELSQL_CACHE_ENABLED", "true")?,
            cache_max_entries: parse_env_var("RELSQL_CACHE_MAX_ENTRIES", "1000")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation.
    /// Flags the user did not pass keep their defaults.
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(dialect) = cli.dialect {
            config.dialect = dialect.parse::<DialectType>().map_err(|e: String| ConfigError::Parse {
                field: "dialect".to_string(),
                value: dialect.clone(),
                source: e.into(),
            })?;
        }
        config.quote_identifiers = cli.quote_identifiers;

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with CLI settings (CLI overrides file and environment).
    /// Only flags that were actually given replace existing values.
    pub fn merge(&mut self, cli: &CliConfig) -> Result<(), ConfigError> {
        if let Some(dialect) = &cli.dialect {
            self.dialect = dialect.parse::<DialectType>().map_err(|e: String| ConfigError::Parse {
                field: "dialect".to_string(),
                value: dialect.clone(),
                source: e.into(),
            })?;
        }
        if cli.quote_identifiers {
            self.quote_identifiers = true;
        }
        self.validate()?;
        Ok(())
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub dialect: Option<String>,
    pub quote_identifiers: bool,
}

fn validate_alias_prefix(prefix: &str) -> Result<(), ValidationError> {
    if prefix.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("alias_prefix");
        err.message = Some("Alias prefix must contain only ASCII letters".into());
        Err(err)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

/// Like [`parse_env_var`] for types whose parse error is a plain message
fn parse_with<T>(key: &str, default: &str, parse: fn(&str) -> Result<T, String>) -> Result<T, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    parse(&value).map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: e.into(),
    })
}
