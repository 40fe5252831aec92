//! SQL text generation from processed trees.

pub mod binder;
pub mod precedence;
pub mod renderer;

pub use binder::{expand_key_comparison, Binding, ParameterBinder, TranslatedQuery};
pub use renderer::{render, TableAliasPolicy};
