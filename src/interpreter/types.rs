//! Interpreter state and execution-budget types.

use std::collections::HashMap;

use crate::ast::types::Script;

/// A defined shell function: its body plus the source text it was defined
/// from (kept for diagnostics, e.g. `type -t` style introspection).
#[derive(Debug, Clone)]
pub struct ShellFunction {
    pub body: Vec<crate::ast::types::Statement>,
    #[allow(dead_code)]
    pub source_text: String,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub value: String,
    pub exported: bool,
}

/// `set -e` / `set -x`: the only two `set` options this emulator wires up
/// behaviorally; others are accepted and stored by the
/// `set` builtin without changing evaluation.
#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    pub errexit: bool,
    pub xtrace: bool,
}

/// Execution budgets enforced per top-level `exec` call.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionLimits {
    pub max_recursion_depth: u32,
    pub max_command_count: u64,
    pub max_loop_iterations: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self { max_recursion_depth: 100, max_command_count: 10_000, max_loop_iterations: 10_000 }
    }
}

/// One function-call frame: positional parameters and `local` variables.
#[derive(Debug, Clone, Default)]
pub struct CallFrame {
    pub positional: Vec<String>,
    pub locals: HashMap<String, Variable>,
}

/// The shell's persistent, mutable state. Variables and functions persist
/// across `exec` calls; budget counters are reset at the start of each
/// top-level `exec`.
#[derive(Debug, Clone)]
pub struct InterpreterState {
    pub cwd: String,
    pub variables: HashMap<String, Variable>,
    pub functions: HashMap<String, ShellFunction>,
    pub last_exit_code: i32,
    pub options: ShellOptions,

    /// Stack of active function call frames; empty at top level, where
    /// `$1..$9`/`$#`/`$@` refer to the script's own arguments (always empty
    /// here, since scripts are not invoked with arguments).
    pub call_stack: Vec<CallFrame>,

    pub command_count: u64,
    pub recursion_depth: u32,
}

impl InterpreterState {
    pub fn new(cwd: String, env: HashMap<String, String>, exported: &[&str]) -> Self {
        let mut variables = HashMap::new();
        for (k, v) in env {
            let exported = exported.contains(&k.as_str());
            variables.insert(k, Variable { value: v, exported });
        }
        Self {
            cwd,
            variables,
            functions: HashMap::new(),
            last_exit_code: 0,
            options: ShellOptions::default(),
            call_stack: Vec::new(),
            command_count: 0,
            recursion_depth: 0,
        }
    }

    /// A deep copy used for subshells: mutations inside are
    /// discarded entirely on exit, only the exit code survives.
    pub fn snapshot_for_subshell(&self) -> Self {
        self.clone()
    }

    pub fn get_var(&self, name: &str) -> Option<String> {
        if let Some(frame) = self.call_stack.last() {
            if let Some(v) = frame.locals.get(name) {
                return Some(v.value.clone());
            }
        }
        self.variables.get(name).map(|v| v.value.clone())
    }

    pub fn set_var(&mut self, name: &str, value: String) {
        if let Some(frame) = self.call_stack.last_mut() {
            if frame.locals.contains_key(name) {
                frame.locals.get_mut(name).unwrap().value = value;
                return;
            }
        }
        match self.variables.get_mut(name) {
            Some(v) => v.value = value,
            None => {
                self.variables.insert(name.to_string(), Variable { value, exported: false });
            }
        }
    }

    pub fn set_local(&mut self, name: &str, value: String) {
        if let Some(frame) = self.call_stack.last_mut() {
            frame.locals.insert(name.to_string(), Variable { value, exported: false });
        } else {
            self.set_var(name, value);
        }
    }

    pub fn export_var(&mut self, name: &str) {
        self.variables
            .entry(name.to_string())
            .or_insert(Variable { value: String::new(), exported: false })
            .exported = true;
    }

    pub fn unset_var(&mut self, name: &str) {
        if let Some(frame) = self.call_stack.last_mut() {
            if frame.locals.remove(name).is_some() {
                return;
            }
        }
        self.variables.remove(name);
    }

    /// Environment visible to dispatched commands: every exported variable
    /// plus the always-visible `PWD`/`?`.
    pub fn exported_env(&self) -> HashMap<String, String> {
        let mut env: HashMap<String, String> =
            self.variables.iter().filter(|(_, v)| v.exported).map(|(k, v)| (k.clone(), v.value.clone())).collect();
        env.insert("PWD".to_string(), self.cwd.clone());
        env.insert("?".to_string(), self.last_exit_code.to_string());
        env
    }
}

/// The result of executing a script, statement, pipeline, or command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecResult {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_code: i32) -> Self {
        Self { stdout: stdout.into(), stderr: stderr.into(), exit_code }
    }

    pub fn ok() -> Self {
        Self::default()
    }

    pub fn append(&mut self, other: &ExecResult) {
        self.stdout.push_str(&other.stdout);
        self.stderr.push_str(&other.stderr);
        self.exit_code = other.exit_code;
    }
}

/// A parsed function definition paired with its compiled body, cached so
/// `functions` can be looked up without re-parsing (kept private to the
/// facade; `ShellFunction` is the externally visible type).
#[allow(dead_code)]
pub(crate) struct CompiledScript {
    pub script: Script,
}
