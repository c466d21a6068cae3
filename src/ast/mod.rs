//! AST node definitions for the shell grammar.

pub mod types;

pub use types::*;
