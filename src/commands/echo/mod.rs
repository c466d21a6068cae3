//! `echo`: intentionally minimal — just `-n` and argument
//! joining. Escape interpretation (`-e`) is the kind of option-surface
//! expansion the crate's scope note explicitly keeps out.

use crate::commands::types::{Command, CommandContext};
use crate::interpreter::types::ExecResult;

pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn execute(&self, ctx: &CommandContext) -> ExecResult {
        let mut args = ctx.args.as_slice();
        let mut newline = true;
        if args.first().map(|s| s.as_str()) == Some("-n") {
            newline = false;
            args = &args[1..];
        }
        let mut out = args.join(" ");
        if newline {
            out.push('\n');
        }
        ExecResult::new(out, "", 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;
    use crate::interpreter::sync_fs::SyncFsAdapter;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn ctx<'a>(args: Vec<&str>, fs: &'a SyncFsAdapter) -> CommandContext<'a> {
        CommandContext {
            args: args.into_iter().map(String::from).collect(),
            stdin: String::new(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs,
            exec_fn: None,
        }
    }

    #[test]
    fn joins_args_with_trailing_newline() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::new());
        let fs = SyncFsAdapter::new(afs, runtime.handle().clone());
        let result = EchoCommand.execute(&ctx(vec!["hello", "world"], &fs));
        assert_eq!(result.stdout, "hello world\n");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn dash_n_suppresses_newline() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::new());
        let fs = SyncFsAdapter::new(afs, runtime.handle().clone());
        let result = EchoCommand.execute(&ctx(vec!["-n", "hi"], &fs));
        assert_eq!(result.stdout, "hi");
    }
}
