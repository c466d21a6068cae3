//! The public entry point: construct a `Bash` with `BashOptions`,
//! then call `exec` with script text. Ties the lexer/parser/expansion/
//! evaluator stack together behind a single async method, bridging to the
//! synchronous evaluator with `block_in_place`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::commands::{default_registry, CommandRegistry};
use crate::fs::{FileSystem, FsError, InMemoryFs, InitialFiles, MkdirOptions};
use crate::interpreter::execution_engine::ExecutionEngine;
use crate::interpreter::sync_fs::SyncFsAdapter;
use crate::interpreter::types::{ExecResult, ExecutionLimits, InterpreterState};

const DEFAULT_CWD: &str = "/home/user";
const EXPORTED_BY_DEFAULT: &[&str] = &["HOME", "PATH", "IFS", "PWD"];

/// Options for creating a `Bash` environment.
#[derive(Default)]
pub struct BashOptions {
    /// Initial environment variables, merged over the built-in defaults.
    pub env: Option<HashMap<String, String>>,
    /// Starting working directory (default `/home/user`).
    pub cwd: Option<String>,
    /// Filesystem backing (default: a fresh `InMemoryFs`).
    pub fs: Option<Arc<dyn FileSystem>>,
    /// Files to seed the filesystem with before the standard layout is
    /// created, so callers can pre-populate a project tree.
    pub initial_files: Option<InitialFiles>,
    /// Execution budgets (default: `ExecutionLimits::default()`).
    pub limits: Option<ExecutionLimits>,
}

/// Per-`exec` overrides. None of the fields are required; a plain
/// `Bash::exec` call is the common case.
#[derive(Default)]
pub struct ExecOptions {
    /// Temporary environment variables, visible only to this `exec` call.
    pub env: Option<HashMap<String, String>>,
}

/// The shell environment: owns the persistent interpreter state and the
/// filesystem it runs against. Variables, functions, and `cwd` survive
/// across `exec` calls; the command/recursion budget counters reset at the
/// start of each one.
pub struct Bash {
    pub fs: Arc<dyn FileSystem>,
    limits: ExecutionLimits,
    registry: CommandRegistry,
    state: InterpreterState,
}

impl Bash {
    /// Builds a `Bash` environment: seeds the standard directory layout
    /// (`/bin`, `/usr/bin`, `/home/user`, `/tmp`) plus any caller-supplied
    /// `initial_files`, and establishes the default environment variables a
    /// POSIX shell starts with.
    pub async fn new(options: BashOptions) -> Self {
        let cwd = options.cwd.unwrap_or_else(|| DEFAULT_CWD.to_string());

        let fs: Arc<dyn FileSystem> = options.fs.unwrap_or_else(|| Arc::new(InMemoryFs::new()));
        let limits = options.limits.unwrap_or_default();

        if let Some(files) = &options.initial_files {
            for (path, content) in files {
                let _ = fs.write_file(path, content).await;
            }
        }
        init_filesystem(&*fs, &cwd).await;

        let mut env = HashMap::new();
        env.insert("HOME".to_string(), cwd.clone());
        env.insert("PATH".to_string(), "/usr/bin:/bin".to_string());
        env.insert("IFS".to_string(), " \t\n".to_string());
        env.insert("PWD".to_string(), cwd.clone());
        if let Some(user_env) = options.env {
            env.extend(user_env);
        }

        let state = InterpreterState::new(cwd, env, EXPORTED_BY_DEFAULT);

        Self { fs, limits, registry: default_registry(), state }
    }

    /// Executes one script against this environment's persistent state.
    /// Budget counters (command count, recursion depth) reset at the start
    /// of every call; variables, functions, and `cwd` carry over.
    pub async fn exec(&mut self, script: &str) -> ExecResult {
        self.exec_with(script, ExecOptions::default()).await
    }

    /// `exec` with temporary environment overrides: the
    /// overrides are applied before parsing and restored afterward,
    /// regardless of how the script finished.
    pub async fn exec_with(&mut self, script: &str, options: ExecOptions) -> ExecResult {
        self.state.command_count = 0;
        self.state.recursion_depth = 0;

        let saved: Vec<(String, Option<String>)> = options
            .env
            .iter()
            .flatten()
            .map(|(name, _)| (name.clone(), self.state.get_var(name)))
            .collect();
        if let Some(env) = &options.env {
            for (name, value) in env {
                self.state.set_var(name, value.clone());
                self.state.export_var(name);
            }
        }

        let ast = match crate::parser::parse(script) {
            Ok(ast) => ast,
            Err(e) => {
                for (name, old) in saved {
                    match old {
                        Some(v) => self.state.set_var(&name, v),
                        None => self.state.unset_var(&name),
                    }
                }
                return ExecResult::new("", format!("bash: syntax error: {e}\n"), 2);
            }
        };

        let fs = self.fs.clone();
        let limits = self.limits;
        let registry = &self.registry;
        let state = &mut self.state;

        let result = tokio::task::block_in_place(|| {
            let handle = tokio::runtime::Handle::current();
            let sync_fs = SyncFsAdapter::new(fs, handle);
            let engine = ExecutionEngine::new(&sync_fs, limits, registry);
            engine.execute_script(state, &ast)
        });

        for (name, old) in saved {
            match old {
                Some(v) => self.state.set_var(&name, v),
                None => self.state.unset_var(&name),
            }
        }
        result
    }

    /// Reads a file relative to the current working directory.
    pub async fn read_file(&self, path: &str) -> Result<String, FsError> {
        let resolved = self.fs.resolve_path(&self.state.cwd, path);
        self.fs.read_file(&resolved).await
    }

    /// Writes a file relative to the current working directory.
    pub async fn write_file(&self, path: &str, content: &str) -> Result<(), FsError> {
        let resolved = self.fs.resolve_path(&self.state.cwd, path);
        self.fs.write_file(&resolved, content).await
    }

    pub fn cwd(&self) -> &str {
        &self.state.cwd
    }

    pub fn get_var(&self, name: &str) -> Option<String> {
        self.state.get_var(name)
    }
}

/// Seeds the directories a shell conventionally expects to find, beyond
/// whatever the caller already populated via `initial_files`.
async fn init_filesystem(fs: &dyn FileSystem, cwd: &str) {
    let _ = fs.mkdir("/bin", &MkdirOptions { recursive: true }).await;
    let _ = fs.mkdir("/usr/bin", &MkdirOptions { recursive: true }).await;
    let _ = fs.mkdir("/tmp", &MkdirOptions { recursive: true }).await;
    let _ = fs.mkdir(cwd, &MkdirOptions { recursive: true }).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exec_runs_a_simple_command() {
        let mut bash = Bash::new(BashOptions::default()).await;
        let result = bash.exec("echo hello world").await;
        assert_eq!(result.stdout, "hello world\n");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn state_persists_across_exec_calls() {
        let mut bash = Bash::new(BashOptions::default()).await;
        bash.exec("X=42").await;
        let result = bash.exec("echo $X").await;
        assert_eq!(result.stdout, "42\n");
    }

    #[tokio::test]
    async fn cwd_persists_across_exec_calls() {
        let mut bash = Bash::new(BashOptions::default()).await;
        bash.exec("cd /tmp").await;
        assert_eq!(bash.cwd(), "/tmp");
        let result = bash.exec("pwd").await;
        assert_eq!(result.stdout, "/tmp\n");
    }

    #[tokio::test]
    async fn syntax_error_reports_exit_code_two() {
        let mut bash = Bash::new(BashOptions::default()).await;
        let result = bash.exec("if true; then").await;
        assert_eq!(result.exit_code, 2);
        assert!(result.stderr.contains("syntax error"));
    }

    #[tokio::test]
    async fn command_budget_resets_between_exec_calls() {
        let limits = ExecutionLimits { max_command_count: 3, ..ExecutionLimits::default() };
        let mut bash = Bash::new(BashOptions { limits: Some(limits), ..Default::default() }).await;
        let first = bash.exec("echo a; echo b").await;
        assert_eq!(first.exit_code, 0);
        let second = bash.exec("echo c; echo d").await;
        assert_eq!(second.exit_code, 0);
    }

    #[tokio::test]
    async fn initial_files_are_readable_at_startup() {
        let mut files = InitialFiles::new();
        files.insert("/home/user/greeting.txt".to_string(), "hi\n".to_string());
        let mut bash = Bash::new(BashOptions { initial_files: Some(files), ..Default::default() }).await;
        let result = bash.exec("cat greeting.txt").await;
        assert_eq!(result.stdout, "hi\n");
    }

    #[tokio::test]
    async fn exec_with_temporary_env_does_not_leak() {
        let mut bash = Bash::new(BashOptions::default()).await;
        let mut env = HashMap::new();
        env.insert("TMP_VAR".to_string(), "scoped".to_string());
        let result = bash.exec_with("echo $TMP_VAR", ExecOptions { env: Some(env) }).await;
        assert_eq!(result.stdout, "scoped\n");
        let after = bash.exec("echo ${TMP_VAR:-gone}").await;
        assert_eq!(after.stdout, "gone\n");
    }
}
