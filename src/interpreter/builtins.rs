//! Evaluator-handled built-ins: `cd`, `export`, `unset`, `set`,
//! `local`, `shift`, `:`, `read`. These mutate shell state directly, which
//! is exactly why they bypass the registry (registry commands only ever see
//! an immutable snapshot); one handler function per built-in.

use std::collections::HashMap;

use crate::interpreter::sync_fs::SyncFs;
use crate::interpreter::types::{ExecResult, InterpreterState};

pub const BUILTIN_NAMES: &[&str] = &["cd", "export", "unset", "set", "local", "shift", ":", "read"];

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_NAMES.contains(&name)
}

pub fn dispatch(state: &mut InterpreterState, fs: &dyn SyncFs, name: &str, args: &[String], stdin: &str) -> ExecResult {
    match name {
        "cd" => handle_cd(state, fs, args),
        "export" => handle_export(state, args),
        "unset" => handle_unset(state, args),
        "set" => handle_set(state, args),
        "local" => handle_local(state, args),
        "shift" => handle_shift(state, args),
        ":" => ExecResult::new("", "", 0),
        "read" => handle_read(state, args, stdin),
        _ => unreachable!("dispatch called for non-builtin {name}"),
    }
}

fn handle_cd(state: &mut InterpreterState, fs: &dyn SyncFs, args: &[String]) -> ExecResult {
    let target = match args.first().map(|s| s.as_str()) {
        None | Some("~") => state.get_var("HOME").unwrap_or_else(|| "/".to_string()),
        Some(other) => other.to_string(),
    };

    let new_dir = fs.resolve_path(&state.cwd, &target);
    if !fs.exists(&new_dir) {
        return ExecResult::new("", format!("cd: {target}: No such file or directory\n"), 1);
    }
    match fs.stat(&new_dir) {
        Ok(stat) if !stat.is_dir => ExecResult::new("", format!("cd: {target}: Not a directory\n"), 1),
        Ok(_) => {
            state.cwd = new_dir;
            ExecResult::new("", "", 0)
        }
        Err(e) => ExecResult::new("", format!("cd: {target}: {e}\n"), 1),
    }
}

fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn handle_export(state: &mut InterpreterState, args: &[String]) -> ExecResult {
    if args.is_empty() {
        let mut pairs: Vec<(String, String)> =
            state.variables.iter().filter(|(_, v)| v.exported).map(|(k, v)| (k.clone(), v.value.clone())).collect();
        pairs.sort();
        let mut stdout = String::new();
        for (name, value) in pairs {
            stdout.push_str(&format!("declare -x {name}=\"{value}\"\n"));
        }
        return ExecResult::new(stdout, "", 0);
    }

    for arg in args {
        if let Some((name, value)) = arg.split_once('=') {
            if !is_valid_var_name(name) {
                return ExecResult::new("", format!("export: `{arg}': not a valid identifier\n"), 1);
            }
            state.set_var(name, value.to_string());
            state.export_var(name);
        } else {
            if !is_valid_var_name(arg) {
                return ExecResult::new("", format!("export: `{arg}': not a valid identifier\n"), 1);
            }
            state.export_var(arg);
        }
    }
    ExecResult::new("", "", 0)
}

fn handle_unset(state: &mut InterpreterState, args: &[String]) -> ExecResult {
    for name in args {
        state.unset_var(name);
    }
    ExecResult::new("", "", 0)
}

/// `set -e`/`set -x`/`set +e`/`set +x`: the only two
/// options this emulator wires up behaviorally; unknown flags are accepted
/// without error to keep scripts using other options from failing outright.
fn handle_set(state: &mut InterpreterState, args: &[String]) -> ExecResult {
    for arg in args {
        let Some(flags) = arg.strip_prefix('-').or_else(|| arg.strip_prefix('+')) else { continue };
        let enable = arg.starts_with('-');
        for flag in flags.chars() {
            match flag {
                'e' => state.options.errexit = enable,
                'x' => state.options.xtrace = enable,
                _ => {}
            }
        }
    }
    ExecResult::new("", "", 0)
}

fn handle_local(state: &mut InterpreterState, args: &[String]) -> ExecResult {
    for arg in args {
        if let Some((name, value)) = arg.split_once('=') {
            state.set_local(name, value.to_string());
        } else {
            state.set_local(arg, String::new());
        }
    }
    ExecResult::new("", "", 0)
}

fn handle_shift(state: &mut InterpreterState, args: &[String]) -> ExecResult {
    let n: usize = args.first().and_then(|s| s.parse().ok()).unwrap_or(1);
    if let Some(frame) = state.call_stack.last_mut() {
        if n > frame.positional.len() {
            return ExecResult::new("", "", 1);
        }
        frame.positional.drain(0..n);
    }
    ExecResult::new("", "", 0)
}

/// `read [name...]`: splits one line of `stdin` on `IFS` and binds it to the
/// named variables (extra words collapse into the last name, bash-style);
/// with no names, binds `REPLY`.
fn handle_read(state: &mut InterpreterState, args: &[String], stdin: &str) -> ExecResult {
    let line = stdin.lines().next().unwrap_or("").to_string();
    let names: Vec<&str> = if args.is_empty() { vec!["REPLY"] } else { args.iter().map(|s| s.as_str()).collect() };
    let mut words: Vec<&str> = line.split_whitespace().collect();
    let exit_code = if line.is_empty() && stdin.is_empty() { 1 } else { 0 };

    for (i, name) in names.iter().enumerate() {
        if i + 1 == names.len() {
            state.set_var(name, words.join(" "));
            words.clear();
        } else if !words.is_empty() {
            state.set_var(name, words.remove(0).to_string());
        } else {
            state.set_var(name, String::new());
        }
    }
    ExecResult::new("", "", exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFs;
    use crate::interpreter::sync_fs::SyncFsAdapter;
    use std::sync::Arc;

    fn state() -> InterpreterState {
        InterpreterState::new("/".to_string(), HashMap::new(), &[])
    }

    fn fs() -> (tokio::runtime::Runtime, SyncFsAdapter) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::new());
        let adapter = SyncFsAdapter::new(afs, runtime.handle().clone());
        (runtime, adapter)
    }

    #[test]
    fn export_sets_and_marks_exported() {
        let mut s = state();
        let result = handle_export(&mut s, &["A=1".to_string()]);
        assert_eq!(result.exit_code, 0);
        assert_eq!(s.get_var("A"), Some("1".to_string()));
        assert!(s.variables["A"].exported);
    }

    #[test]
    fn unset_removes_variable() {
        let mut s = state();
        s.set_var("A", "1".to_string());
        handle_unset(&mut s, &["A".to_string()]);
        assert_eq!(s.get_var("A"), None);
    }

    #[test]
    fn set_e_and_set_x_toggle_options() {
        let mut s = state();
        handle_set(&mut s, &["-e".to_string(), "-x".to_string()]);
        assert!(s.options.errexit);
        assert!(s.options.xtrace);
        handle_set(&mut s, &["+e".to_string()]);
        assert!(!s.options.errexit);
    }

    #[test]
    fn cd_updates_cwd_when_directory_exists() {
        let (_rt, adapter) = fs();
        adapter.mkdir("/project", false).unwrap();
        let mut s = state();
        let result = handle_cd(&mut s, &adapter, &["/project".to_string()]);
        assert_eq!(result.exit_code, 0);
        assert_eq!(s.cwd, "/project");
    }

    #[test]
    fn cd_missing_dir_errors() {
        let (_rt, adapter) = fs();
        let mut s = state();
        let result = handle_cd(&mut s, &adapter, &["/missing".to_string()]);
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("No such file or directory"));
    }

    #[test]
    fn shift_drops_leading_positional_params() {
        let mut s = state();
        s.call_stack.push(crate::interpreter::types::CallFrame {
            positional: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            locals: HashMap::new(),
        });
        handle_shift(&mut s, &[]);
        assert_eq!(s.call_stack.last().unwrap().positional, vec!["b", "c"]);
    }

    #[test]
    fn read_splits_stdin_into_names() {
        let mut s = state();
        let result = handle_read(&mut s, &["a".to_string(), "b".to_string()], "one two three\n");
        assert_eq!(result.exit_code, 0);
        assert_eq!(s.get_var("a"), Some("one".to_string()));
        assert_eq!(s.get_var("b"), Some("two three".to_string()));
    }
}
