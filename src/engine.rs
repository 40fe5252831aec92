//! Translation engine.
//!
//! The single entry point for callers: owns the catalog, the configured
//! dialect and the optional translation cache, and runs every query through
//! translate (with marker linking) → dialect processing → rendering.

use std::sync::Arc;

use log::info;
use thiserror::Error;
use validator::Validate;

use crate::config::{ConfigError, TranslatorConfig};
use crate::dialect::{self, Dialect, DialectRegistry, QuotingStrategy};
use crate::entity_catalog::{CatalogError, EntityCatalog};
use crate::qualifier_parser::{parse_qualifier, QualifierParseError};
use crate::sql_ast::Node;
use crate::sql_generator::{render, TranslatedQuery};
use crate::translation_cache::{CacheMetrics, TranslationCache, TranslationCacheConfig, TranslationCacheKey};
use crate::translator::{
    self, DeleteQuery, InsertQuery, QueryParameters, SelectQuery, SqlTemplate, TranslationError,
    TranslationOptions, UpdateQuery,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Qualifier parse error: {0}")]
    QualifierParse(#[from] QualifierParseError),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dialect `{0}` is not registered")]
    UnknownDialect(String),

    #[error("Cannot describe query for caching: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct Engine {
    catalog: Arc<EntityCatalog>,
    config: TranslatorConfig,
    dialect: Arc<dyn Dialect>,
    quoting: Box<dyn QuotingStrategy>,
    options: TranslationOptions,
    cache: Option<TranslationCache>,
}

impl Engine {
    /// Creates an engine using the built-in dialects
    pub fn new(catalog: Arc<EntityCatalog>, config: TranslatorConfig) -> Result<Self, EngineError> {
        Self::with_registry(catalog, config, &DialectRegistry::new())
    }

    /// Creates an engine resolving the configured dialect in `registry`
    pub fn with_registry(
        catalog: Arc<EntityCatalog>,
        config: TranslatorConfig,
        registry: &DialectRegistry,
    ) -> Result<Self, EngineError> {
        config.validate().map_err(ConfigError::from)?;

        let dialect = registry
            .get(&config.dialect)
            .ok_or_else(|| EngineError::UnknownDialect(config.dialect.to_string()))?;
        let quoting = dialect.quoting_strategy(config.quote_identifiers);
        let options = TranslationOptions {
            alias_prefix: config.alias_prefix.clone(),
            force_distinct_on_to_many: config.force_distinct_on_to_many,
        };
        let cache = config.cache_enabled.then(|| {
            TranslationCache::new(TranslationCacheConfig {
                enabled: true,
                max_entries: config.cache_max_entries,
            })
        });

        info!(
            "Translation engine ready: dialect={}, {} entities, cache={}",
            dialect.dialect_type(),
            catalog.len(),
            if cache.is_some() { "on" } else { "off" }
        );

        Ok(Engine {
            catalog,
            config,
            dialect,
            quoting,
            options,
            cache,
        })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    pub fn translate_select(&self, query: &SelectQuery) -> Result<TranslatedQuery, EngineError> {
        let description = format!("select:{}", serde_json::to_string(query)?);
        self.cached("SELECT", &description, &query.entity, &query.parameters, || {
            translator::translate_select(&self.catalog, query, &self.options)
        })
    }

    pub fn translate_insert(&self, query: &InsertQuery) -> Result<TranslatedQuery, EngineError> {
        let description = format!("insert:{}", serde_json::to_string(query)?);
        self.cached("INSERT", &description, &query.entity, &QueryParameters::default(), || {
            translator::translate_insert(&self.catalog, query)
        })
    }

    pub fn translate_update(&self, query: &UpdateQuery) -> Result<TranslatedQuery, EngineError> {
        let description = format!("update:{}", serde_json::to_string(query)?);
        self.cached("UPDATE", &description, &query.entity, &query.parameters, || {
            translator::translate_update(&self.catalog, query, &self.options.alias_prefix)
        })
    }

    pub fn translate_delete(&self, query: &DeleteQuery) -> Result<TranslatedQuery, EngineError> {
        let description = format!("delete:{}", serde_json::to_string(query)?);
        self.cached("DELETE", &description, &query.entity, &query.parameters, || {
            translator::translate_delete(&self.catalog, query, &self.options.alias_prefix)
        })
    }

    /// Parses `qualifier` and selects the matching `entity` rows.
    pub fn translate_qualifier(
        &self,
        entity: &str,
        qualifier: &str,
        parameters: QueryParameters,
    ) -> Result<TranslatedQuery, EngineError> {
        let query = SelectQuery::new(entity)
            .qualifier(parse_qualifier(qualifier)?)
            .parameters(parameters);
        self.translate_select(&query)
    }

    /// Expands a raw SQL template with `#if`/`#bind` directives.
    pub fn translate_template(
        &self,
        source: &str,
        parameters: &QueryParameters,
    ) -> Result<TranslatedQuery, EngineError> {
        let description = format!("template:{}", source);
        self.cached("template", &description, "", parameters, || {
            let template = SqlTemplate::parse(source)?;
            translator::translate_template(&self.catalog, &template, parameters)
        })
    }

    /// Cache counters; `None` when caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheMetrics> {
        self.cache.as_ref().map(TranslationCache::metrics)
    }

    fn cached(
        &self,
        kind: &str,
        description: &str,
        entity: &str,
        parameters: &QueryParameters,
        translate: impl FnOnce() -> Result<Node, TranslationError>,
    ) -> Result<TranslatedQuery, EngineError> {
        let key = self
            .cache
            .as_ref()
            .map(|_| TranslationCacheKey::new(description, entity, self.dialect.dialect_type().as_str(), parameters));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                return Ok(hit);
            }
        }

        let linked = translate()?;
        let translated = self.finish(linked)?;
        info!(
            "Translated {} {} for {}: {} binding(s)",
            self.dialect.dialect_type(),
            kind,
            if entity.is_empty() { "<template>" } else { entity },
            translated.bindings.len()
        );

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            cache.insert(key, translated.clone());
        }
        Ok(translated)
    }

    /// Dialect processing and rendering of a linked tree.
    fn finish(&self, linked: Node) -> Result<TranslatedQuery, TranslationError> {
        let processed = dialect::process(self.dialect.as_ref(), linked)?;
        render(&processed, self.quoting.as_ref(), self.config.table_aliases)
    }
}
