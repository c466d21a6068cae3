//! Virtual filesystem capability.
//!
//! The shell core consumes only the `FileSystem` trait; this module's
//! `InMemoryFs` is the default (and, for now, only) implementation; no
//! host OS resources are ever touched.

pub mod in_memory_fs;
pub mod types;

pub use in_memory_fs::InMemoryFs;
pub use types::*;
