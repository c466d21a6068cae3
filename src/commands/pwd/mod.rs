//! `pwd`: prints the current working directory. Real shells distinguish
//! `-P`/`-L` (resolve vs. preserve symlinks); the virtual filesystem has no
//! symlink concept, so that distinction is dropped and all arguments are
//! simply ignored.

use crate::commands::types::{Command, CommandContext};
use crate::interpreter::types::ExecResult;

pub struct PwdCommand;

impl Command for PwdCommand {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn execute(&self, ctx: &CommandContext) -> ExecResult {
        ExecResult::new(format!("{}\n", ctx.cwd), "", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;
    use crate::interpreter::sync_fs::SyncFsAdapter;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn prints_cwd_with_trailing_newline() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::new());
        let fs = SyncFsAdapter::new(afs, runtime.handle().clone());
        let ctx = CommandContext {
            args: vec!["-P".to_string()],
            stdin: String::new(),
            cwd: "/home/user/project".to_string(),
            env: HashMap::new(),
            fs: &fs,
            exec_fn: None,
        };
        let result = PwdCommand.execute(&ctx);
        assert_eq!(result.stdout, "/home/user/project\n");
        assert_eq!(result.exit_code, 0);
    }
}
