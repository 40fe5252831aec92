//! Query translation: source queries in, linked dialect-neutral SQL trees out.
//!
//! Each `translate_*` function creates its own [`TranslationContext`], so
//! translations share nothing but the read-only entity catalog.

pub mod errors;
pub mod function_registry;
pub mod modify_translator;
pub mod path_resolver;
pub mod qualifier_translator;
pub mod query;
pub mod select_translator;
pub mod template;
pub mod translation_ctx;

pub use errors::{
    JoinPlanningError, SchemaResolutionError, TranslationError, TranslationStateError,
    UnsupportedConstructError,
};
pub use modify_translator::{translate_delete, translate_insert, translate_update};
pub use query::{
    DeleteQuery, InsertQuery, Ordering, QueryParameters, ResultColumn, SelectQuery, UpdateQuery,
};
pub use select_translator::{translate_select, TranslationOptions};
pub use template::{translate_template, SqlTemplate, TemplateNode};
pub use translation_ctx::{IdPath, TranslationContext};
