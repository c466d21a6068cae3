//! Registry commands: a small, intentionally minimal set of
//! utilities that give the evaluator and `find -exec` something real to
//! dispatch to, plus `find` itself, whose expression grammar is the one
//! user-facing command body this crate treats as in scope.

pub mod cat;
pub mod echo;
pub mod find;
pub mod pwd;
pub mod registry;
pub mod test_cmd;
pub mod true_false;
pub mod types;

pub use registry::{default_registry, CommandRegistry};
pub use types::{Command, CommandContext, ExecFn};
