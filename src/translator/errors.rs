//! # Translation Error Types
//!
//! Every translation failure falls into exactly one of four categories, all
//! of which abort the translation:
//!
//! - [`SchemaResolutionError`]: a path names something the catalog lacks
//! - [`JoinPlanningError`]: a relationship chain cannot become a valid join
//! - [`TranslationStateError`]: markers or parameters are used inconsistently
//! - [`UnsupportedConstructError`]: nothing can express the construct for the target dialect
//!
//! Use the `*_with_context` helpers so messages say where the failure happened:
//!
//! ```ignore
//! SchemaResolutionError::attribute_with_context("Artist", "artistNam", "While resolving artistNam")
//! ```

use thiserror::Error;

use crate::entity_catalog::CatalogError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationError {
    #[error("Schema resolution error: {0}")]
    SchemaResolution(#[from] SchemaResolutionError),

    #[error("Join planning error: {0}")]
    JoinPlanning(#[from] JoinPlanningError),

    #[error("Translation state error: {0}")]
    TranslationState(#[from] TranslationStateError),

    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(#[from] UnsupportedConstructError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaResolutionError {
    #[error("No entity found for `{entity}`")]
    UnknownEntity { entity: String },

    #[error("Entity `{entity}` has no attribute `{attribute}`")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("Entity `{entity}` has no relationship `{relationship}`")]
    UnknownRelationship { entity: String, relationship: String },

    #[error("Table of entity `{entity}` has no column `{column}`")]
    UnknownColumn { entity: String, column: String },

    #[error("`{segment}` of entity `{entity}` is not a relationship and cannot be traversed")]
    NotARelationship { entity: String, segment: String },
}

impl SchemaResolutionError {
    pub fn attribute_with_context(
        entity: impl Into<String>,
        attribute: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        SchemaResolutionError::UnknownAttribute {
            entity: entity.into(),
            attribute: format!("{}\n  Context: {}", attribute.into(), context.into()),
        }
    }

    pub fn relationship_with_context(
        entity: impl Into<String>,
        relationship: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        SchemaResolutionError::UnknownRelationship {
            entity: entity.into(),
            relationship: format!("{}\n  Context: {}", relationship.into(), context.into()),
        }
    }
}

impl From<CatalogError> for SchemaResolutionError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownEntity { entity } => SchemaResolutionError::UnknownEntity { entity },
            other => SchemaResolutionError::UnknownEntity {
                entity: other.to_string(),
            },
        }
    }
}

impl From<CatalogError> for TranslationError {
    fn from(err: CatalogError) -> Self {
        TranslationError::SchemaResolution(err.into())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JoinPlanningError {
    #[error("Relationship `{entity}.{relationship}` has no joins and its reverse `{reverse}` is missing")]
    MissingReverseRelationship {
        entity: String,
        relationship: String,
        reverse: String,
    },

    #[error("Relationship `{entity}.{relationship}` has no joins and no reverse relationship")]
    EmptyJoin { entity: String, relationship: String },

    #[error("Relationship `{entity}.{relationship}` joins {joins} column(s) but target `{target}` has {keys} primary key(s)")]
    KeyCountMismatch {
        entity: String,
        relationship: String,
        target: String,
        joins: usize,
        keys: usize,
    },

    #[error("Object id for `{entity}` has no value for key column `{column}`")]
    IncompleteObjectId { entity: String, column: String },

    #[error("Path `{path}` requires a join, which `{statement}` statements do not allow")]
    JoinNotAllowed { path: String, statement: String },
}

impl JoinPlanningError {
    pub fn missing_reverse_with_context(
        entity: impl Into<String>,
        relationship: impl Into<String>,
        reverse: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        JoinPlanningError::MissingReverseRelationship {
            entity: entity.into(),
            relationship: relationship.into(),
            reverse: format!("{}\n  Context: {}", reverse.into(), context.into()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationStateError {
    #[error("Marker `{marker}` is referenced but was never defined")]
    UndefinedMarker { marker: String },

    #[error("Marker `{marker}` is placed more than once")]
    DuplicateMarker { marker: String },

    #[error("Marker `{marker}` has content but was never placed")]
    OrphanMarker { marker: String },

    #[error("No value bound for parameter `{name}`")]
    UnboundParameter { name: String },

    #[error("Positional parameter ?{index} is out of range ({available} bound)")]
    PositionalParameterOutOfRange { index: usize, available: usize },

    #[error("Template syntax error: {message}")]
    TemplateSyntax { message: String },
}

impl TranslationStateError {
    pub fn template_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        TranslationStateError::TemplateSyntax {
            message: format!("{}\n  Context: {}", message.into(), context.into()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnsupportedConstructError {
    #[error("Unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("Function `{name}` expects {expected} argument(s), got {actual}")]
    FunctionArity {
        name: String,
        expected: String,
        actual: usize,
    },

    #[error("{construct} must be rewritten by the dialect before rendering")]
    RequiresDialectRewrite { construct: String },

    #[error("{dialect} does not support {construct}")]
    DialectLimitation { dialect: String, construct: String },

    #[error("Cannot use {shape} here: {reason}")]
    ValueShape { shape: String, reason: String },
}

impl UnsupportedConstructError {
    pub fn value_shape_with_context(
        shape: impl Into<String>,
        reason: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        UnsupportedConstructError::ValueShape {
            shape: shape.into(),
            reason: format!("{}\n  Context: {}", reason.into(), context.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wrapping() {
        let err: TranslationError = SchemaResolutionError::UnknownAttribute {
            entity: "Artist".to_string(),
            attribute: "artistNam".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Schema resolution error: Entity `Artist` has no attribute `artistNam`"
        );

        let err: TranslationError = CatalogError::UnknownEntity {
            entity: "Sculpture".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            TranslationError::SchemaResolution(SchemaResolutionError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_with_context_helpers() {
        let err = SchemaResolutionError::attribute_with_context("Artist", "x", "While resolving x");
        assert!(err.to_string().contains("Context: While resolving x"));

        let err = JoinPlanningError::missing_reverse_with_context(
            "Gallery",
            "paintingArray",
            "toGallery",
            "While deriving joins",
        );
        assert!(err.to_string().contains("toGallery"));
        assert!(err.to_string().contains("While deriving joins"));
    }
}
