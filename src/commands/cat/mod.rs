//! `cat`: concatenates files (or stdin via `-`) to stdout, in
//! argument order, continuing past a missing file the way multi-path
//! commands are specified to.

use crate::commands::types::{Command, CommandContext};
use crate::interpreter::types::ExecResult;

pub struct CatCommand;

impl Command for CatCommand {
    fn name(&self) -> &'static str {
        "cat"
    }

    fn execute(&self, ctx: &CommandContext) -> ExecResult {
        let mut files: Vec<&str> = ctx.args.iter().map(|s| s.as_str()).collect();
        if files.is_empty() {
            files.push("-");
        }

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for file in files {
            if file == "-" {
                stdout.push_str(&ctx.stdin);
                continue;
            }
            let path = ctx.fs.resolve_path(&ctx.cwd, file);
            match ctx.fs.read_file(&path) {
                Ok(content) => stdout.push_str(&content),
                Err(_) => {
                    stderr.push_str(&format!("cat: {file}: No such file or directory\n"));
                    exit_code = 1;
                }
            }
        }

        ExecResult::new(stdout, stderr, exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{InMemoryFs, InitialFiles};
    use crate::interpreter::sync_fs::SyncFsAdapter;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn fixture(files: InitialFiles) -> (tokio::runtime::Runtime, SyncFsAdapter) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::with_files(&files));
        let adapter = SyncFsAdapter::new(afs, runtime.handle().clone());
        (runtime, adapter)
    }

    #[test]
    fn concatenates_multiple_files() {
        let mut files = InitialFiles::new();
        files.insert("/a.txt".to_string(), "aaa\n".to_string());
        files.insert("/b.txt".to_string(), "bbb\n".to_string());
        let (_rt, fs) = fixture(files);
        let ctx = CommandContext {
            args: vec!["/a.txt".to_string(), "/b.txt".to_string()],
            stdin: String::new(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs: &fs,
            exec_fn: None,
        };
        let result = CatCommand.execute(&ctx);
        assert_eq!(result.stdout, "aaa\nbbb\n");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn missing_file_reports_and_continues() {
        let mut files = InitialFiles::new();
        files.insert("/exists.txt".to_string(), "content".to_string());
        let (_rt, fs) = fixture(files);
        let ctx = CommandContext {
            args: vec!["/missing.txt".to_string(), "/exists.txt".to_string()],
            stdin: String::new(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs: &fs,
            exec_fn: None,
        };
        let result = CatCommand.execute(&ctx);
        assert_eq!(result.stdout, "content");
        assert!(result.stderr.contains("No such file or directory"));
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dash_reads_stdin() {
        let (_rt, fs) = fixture(InitialFiles::new());
        let ctx = CommandContext {
            args: vec!["-".to_string()],
            stdin: "from stdin\n".to_string(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs: &fs,
            exec_fn: None,
        };
        let result = CatCommand.execute(&ctx);
        assert_eq!(result.stdout, "from stdin\n");
    }
}
