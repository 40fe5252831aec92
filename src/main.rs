use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use log::debug;
use relsql::config::{self, TranslatorConfig};
use relsql::entity_catalog::load_catalog;
use relsql::qualifier_parser::parse_qualifier;
use relsql::sql_ast::Value;
use relsql::translator::{Ordering, QueryParameters, SelectQuery};
use relsql::Engine;

/// relsql - translate entity queries into parameterized SQL
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Entity catalog YAML file
    #[arg(long)]
    schema: PathBuf,

    /// Root entity of a SELECT
    #[arg(long, required_unless_present = "template")]
    entity: Option<String>,

    /// Qualifier, e.g. "artistName like $name"
    #[arg(long, conflicts_with = "template")]
    qualifier: Option<String>,

    /// Raw SQL template with #if/#bind directives
    #[arg(long)]
    template: Option<String>,

    /// Named parameter as name=json, e.g. name='"a%"' (repeatable)
    #[arg(long = "param", value_name = "NAME=JSON")]
    params: Vec<String>,

    /// Ordering as path[:desc] (repeatable)
    #[arg(long = "order-by", value_name = "PATH[:desc]")]
    order_by: Vec<String>,

    /// Relationship path to fetch in the same statement (repeatable)
    #[arg(long = "prefetch", value_name = "PATH")]
    prefetch: Vec<String>,

    #[arg(long)]
    limit: Option<u64>,

    #[arg(long)]
    offset: Option<u64>,

    /// Force SELECT DISTINCT
    #[arg(long)]
    distinct: bool,

    /// Target dialect: generic, postgres, mysql, sqlserver
    #[arg(long)]
    dialect: Option<String>,

    /// Quote identifiers with the dialect's delimiters
    #[arg(long)]
    quote_identifiers: bool,

    /// Translator configuration YAML file (defaults come from RELSQL_* variables)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            dialect: cli.dialect.clone(),
            quote_identifiers: cli.quote_identifiers,
        }
    }
}

fn parse_params(raw: &[String]) -> anyhow::Result<QueryParameters> {
    let mut params = QueryParameters::default();
    for entry in raw {
        let Some((name, json)) = entry.split_once('=') else {
            bail!("Parameter '{}' must look like name=json", entry);
        };
        // Bare words are taken as strings so quoting is optional on the shell
        let value = serde_json::from_str::<serde_json::Value>(json)
            .map(|v| Value::from_json(&v))
            .unwrap_or_else(|_| Value::String(json.to_string()));
        params = params.with_named(name.trim().trim_start_matches(['$', ':']), value);
    }
    Ok(params)
}

fn parse_ordering(raw: &str) -> Ordering {
    match raw.rsplit_once(':') {
        Some((path, direction)) if direction.eq_ignore_ascii_case("desc") => Ordering::desc(path),
        Some((path, direction)) if direction.eq_ignore_ascii_case("asc") => Ordering::asc(path),
        _ => Ordering::asc(raw),
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logger - defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TranslatorConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TranslatorConfig::from_env().context("Invalid RELSQL_* environment")?,
    };
    config.merge(&config::CliConfig::from(&cli))?;
    debug!("Effective configuration: {:?}", config);

    let catalog = load_catalog(&cli.schema)
        .with_context(|| format!("Failed to load entity catalog {}", cli.schema.display()))?;
    let engine = Engine::new(Arc::new(catalog), config)?;
    let params = parse_params(&cli.params)?;

    let translated = match (&cli.template, &cli.entity) {
        (Some(template), _) => engine.translate_template(template, &params)?,
        (None, Some(entity)) => {
            let mut query = SelectQuery::new(entity.as_str())
                .distinct(cli.distinct)
                .parameters(params);
            if let Some(qualifier) = &cli.qualifier {
                query = query.qualifier(parse_qualifier(qualifier)?);
            }
            for ordering in &cli.order_by {
                query = query.order_by(parse_ordering(ordering));
            }
            for path in &cli.prefetch {
                query = query.prefetch(path.as_str());
            }
            if let Some(limit) = cli.limit {
                query = query.limit(limit);
            }
            if let Some(offset) = cli.offset {
                query = query.offset(offset);
            }
            engine.translate_select(&query)?
        }
        (None, None) => bail!("Either --entity or --template is required"),
    };

    println!("{}", serde_json::to_string_pretty(&translated)?);
    Ok(())
}
