//! Unit tests for the public building blocks
mod qualifier_parser_tests;
mod sql_rendering_tests;
