//! `true`/`false`: fixed-exit-code commands, used throughout
//! control-flow tests and as `-exec` placeholders.

use crate::commands::types::{Command, CommandContext};
use crate::interpreter::types::ExecResult;

pub struct TrueCommand;

impl Command for TrueCommand {
    fn name(&self) -> &'static str {
        "true"
    }

    fn execute(&self, _ctx: &CommandContext) -> ExecResult {
        ExecResult::new("", "", 0)
    }
}

pub struct FalseCommand;

impl Command for FalseCommand {
    fn name(&self) -> &'static str {
        "false"
    }

    fn execute(&self, _ctx: &CommandContext) -> ExecResult {
        ExecResult::new("", "", 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;
    use crate::interpreter::sync_fs::SyncFsAdapter;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn empty_ctx(fs: &SyncFsAdapter) -> CommandContext<'_> {
        CommandContext {
            args: vec![],
            stdin: String::new(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs,
            exec_fn: None,
        }
    }

    #[test]
    fn true_exits_zero_false_exits_one() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::new());
        let fs = SyncFsAdapter::new(afs, runtime.handle().clone());
        assert_eq!(TrueCommand.execute(&empty_ctx(&fs)).exit_code, 0);
        assert_eq!(FalseCommand.execute(&empty_ctx(&fs)).exit_code, 1);
    }
}
