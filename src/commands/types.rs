//! The registry command contract: a command receives an
//! immutable snapshot of shell state (`cwd`, `env`, `stdin`) plus filesystem
//! access, and returns an `ExecResult`. Commands that need to mutate shell
//! state (`cd`, `export`, `set`, ...) bypass the registry entirely and are
//! handled by the evaluator directly (`interpreter::builtins`).

use std::collections::HashMap;

use crate::interpreter::sync_fs::SyncFs;
use crate::interpreter::types::ExecResult;

/// Re-enters command dispatch for `find -exec`: runs one already-expanded
/// argv (with `{}` already substituted) through the same registry, without
/// exposing the evaluator's mutable state.
pub type ExecFn<'a> = dyn Fn(&[String], &str) -> ExecResult + 'a;

pub struct CommandContext<'a> {
    pub args: Vec<String>,
    pub stdin: String,
    pub cwd: String,
    pub env: HashMap<String, String>,
    pub fs: &'a dyn SyncFs,
    pub exec_fn: Option<&'a ExecFn<'a>>,
}

pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(&self, ctx: &CommandContext) -> ExecResult;
}
