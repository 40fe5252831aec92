//! relsql - Object query to SQL translation
//!
//! This crate turns queries phrased against an entity model into
//! parameterized SQL for a chosen database dialect:
//! - Entity catalog definitions over existing tables
//! - A textual qualifier language and raw SQL templates
//! - Path resolution with join reuse and alias allocation
//! - Dialect-specific rewriting and SQL rendering with ordered bindings

pub mod config;
pub mod dialect;
pub mod engine;
pub mod entity_catalog;
pub mod qualifier_parser;
pub mod sql_ast;
pub mod sql_generator;
pub mod translation_cache;
pub mod translator;

pub use config::TranslatorConfig;
pub use engine::{Engine, EngineError};
pub use sql_generator::{Binding, TranslatedQuery};
