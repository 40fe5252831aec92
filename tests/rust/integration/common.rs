use std::sync::Arc;

use relsql::dialect::DialectType;
use relsql::entity_catalog::{load_catalog, EntityCatalog};
use relsql::{Engine, TranslatorConfig};

pub const TESTMAP: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/testmap.yaml");

pub fn catalog() -> Arc<EntityCatalog> {
    Arc::new(load_catalog(TESTMAP).expect("test catalog should load"))
}

/// Engine for `dialect` with caching off so every call translates afresh
pub fn engine(dialect: DialectType) -> Engine {
    let config = TranslatorConfig {
        dialect,
        cache_enabled: false,
        ..Default::default()
    };
    Engine::new(catalog(), config).expect("engine should build")
}

pub fn generic_engine() -> Engine {
    engine(DialectType::Generic)
}
