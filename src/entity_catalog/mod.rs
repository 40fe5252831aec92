pub mod config;
pub mod entity_schema;
pub mod errors;

#[allow(unused_imports)]
pub use config::{load_catalog, EntityCatalogConfig, EntityDefinition};
pub use entity_schema::{Attribute, Entity, EntityCatalog, JoinPair, Relationship};
pub use errors::CatalogError;
