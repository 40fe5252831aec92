//! Dialect-neutral SQL syntax tree.
//!
//! The tree is passive data: the translator builds it, the dialect processor
//! rewrites it, and the renderer turns it into SQL text and bindings.

pub mod builder;
pub mod node;
pub mod value;

pub use node::*;
pub use value::{JdbcType, ObjectId, Value};
