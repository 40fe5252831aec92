//! # Entity Catalog Error Types
//!
//! Errors raised while loading, validating or querying entity metadata.
//!
//! When returning catalog errors, use the context helpers so the message says
//! both what failed and where:
//!
//! ```ignore
//! CatalogError::entity_error_with_context("Artist", "While resolving select root")
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("No entity found for `{entity}`")]
    UnknownEntity { entity: String },
    #[error("Duplicate entity `{entity}`")]
    DuplicateEntity { entity: String },
    #[error("Failed to read catalog file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse catalog: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid catalog: {message}")]
    InvalidConfig { message: String },
}

impl CatalogError {
    /// Create an UnknownEntity error with context information
    pub fn entity_error_with_context(entity: impl Into<String>, context: impl Into<String>) -> Self {
        let entity = entity.into();
        let ctx = context.into();
        CatalogError::UnknownEntity {
            entity: format!("{}\n  Context: {}", entity, ctx),
        }
    }

    /// Create an InvalidConfig error naming the offending entity
    pub fn invalid_with_context(entity: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::InvalidConfig {
            message: format!("entity '{}': {}", entity.into(), message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_error_with_context() {
        let err = CatalogError::entity_error_with_context("Artist", "While resolving select root");
        let msg = err.to_string();
        assert!(msg.contains("Artist"));
        assert!(msg.contains("While resolving select root"));
    }

    #[test]
    fn test_invalid_with_context() {
        let err = CatalogError::invalid_with_context("Painting", "duplicate attribute 'paintingTitle'");
        assert_eq!(
            err.to_string(),
            "Invalid catalog: entity 'Painting': duplicate attribute 'paintingTitle'"
        );
    }
}
