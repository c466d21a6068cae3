//! In-process emulation of a POSIX-style shell over a virtual filesystem.
//!
//! `bash::Bash` is the public entry point: construct one with
//! `BashOptions`, then call `exec` with script text. Everything below the
//! façade — lexer, parser, word expansion, evaluator, `find` — is reachable
//! for embedders who want finer-grained control, but `Bash` is the
//! supported surface.

pub mod ast;
pub mod bash;
pub mod commands;
pub mod fs;
pub mod glob;
pub mod interpreter;
pub mod lexer;
pub mod parser;

pub use ast::types::*;
pub use bash::{Bash, BashOptions, ExecOptions};
pub use commands::{default_registry, Command, CommandContext, CommandRegistry};
pub use fs::{FileSystem, FsError, InMemoryFs, InitialFiles};
pub use interpreter::execution_engine::ExecutionEngine;
pub use interpreter::sync_fs::SyncFsAdapter;
pub use interpreter::types::{ExecResult, ExecutionLimits};
pub use parser::{parse, ParseError};
