//! Integration tests: full translations against the gallery test model
mod catalog_loading_tests;
mod common;
mod dialect_tests;
mod modification_tests;
mod template_tests;
mod translation_tests;
