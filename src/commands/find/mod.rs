//! `find`: the one user-facing command body this crate treats
//! as in scope, since its expression grammar and evaluator are part of the
//! hard engineering the façade exists to demonstrate. Traversal is a
//! pre-order DFS with lexicographically sorted siblings; `-maxdepth`/
//! `-mindepth` cap which depths are visited and descended into.

pub mod matcher;
pub mod parser;
pub mod types;

use crate::commands::types::{Command, CommandContext};
use crate::interpreter::sync_fs::SyncFs;
use crate::interpreter::types::ExecResult;
use types::{Expression, FindOptions};

pub struct FindCommand;

impl Command for FindCommand {
    fn name(&self) -> &'static str {
        "find"
    }

    fn execute(&self, ctx: &CommandContext) -> ExecResult {
        let args = &ctx.args;

        let mut search_paths: Vec<String> = Vec::new();
        let mut expr_start = args.len();
        for (i, arg) in args.iter().enumerate() {
            if arg.starts_with('-') || arg == "(" || arg == "\\(" || arg == ")" || arg == "\\)" || arg == "!" {
                expr_start = i;
                break;
            }
            search_paths.push(arg.clone());
        }
        if search_paths.is_empty() {
            search_paths.push(".".to_string());
        }

        let (expression, options) = match parser::parse_expressions(&args[expr_start..]) {
            Ok(parsed) => parsed,
            Err(e) => return ExecResult::new("", format!("{e}\n"), 1),
        };

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut exit_code = 0;

        for search_path in &search_paths {
            let search_path_clean =
                if search_path.len() > 1 && search_path.ends_with('/') { &search_path[..search_path.len() - 1] } else { search_path.as_str() };
            let base_path = ctx.fs.resolve_path(&ctx.cwd, search_path_clean);

            if !ctx.fs.exists(&base_path) {
                stderr.push_str(&format!("find: {search_path_clean}: No such file or directory\n"));
                exit_code = 1;
                continue;
            }

            traverse(ctx, &base_path, search_path_clean, &expression, &options, &mut stdout, &mut stderr, &mut exit_code);
        }

        ExecResult::new(stdout, stderr, exit_code)
    }
}

#[allow(clippy::too_many_arguments)]
fn traverse(
    ctx: &CommandContext,
    path: &str,
    search_path: &str,
    expression: &Expression,
    options: &FindOptions,
    stdout: &mut String,
    stderr: &mut String,
    exit_code: &mut i32,
) {
    visit(ctx, path, path, search_path, 0, expression, options, stdout, stderr, exit_code);
}

#[allow(clippy::too_many_arguments)]
fn visit(
    ctx: &CommandContext,
    current: &str,
    base: &str,
    search_path: &str,
    depth: usize,
    expression: &Expression,
    options: &FindOptions,
    stdout: &mut String,
    stderr: &mut String,
    exit_code: &mut i32,
) {
    if let Some(max) = options.max_depth {
        if depth > max {
            return;
        }
    }

    let stat = match ctx.fs.stat(current) {
        Ok(s) => s,
        Err(_) => return,
    };

    let name = compute_name(current, base, search_path);
    let relative_path = compute_relative_path(current, base, search_path);
    let eval_ctx = types::EvalContext { name, relative_path: relative_path.clone(), is_file: stat.is_file, is_directory: stat.is_dir, depth };

    let at_or_beyond_min = options.min_depth.map_or(true, |min| depth >= min);
    if at_or_beyond_min && matcher::evaluate_with_exec(expression, &eval_ctx, ctx.exec_fn) {
        stdout.push_str(&relative_path);
        stdout.push('\n');
    }

    if stat.is_dir {
        let can_descend = options.max_depth.map_or(true, |max| depth < max);
        if can_descend {
            match ctx.fs.read_dir(current) {
                Ok(mut entries) => {
                    entries.sort();
                    for entry in entries {
                        let child = if current == "/" { format!("/{entry}") } else { format!("{current}/{entry}") };
                        visit(ctx, &child, base, search_path, depth + 1, expression, options, stdout, stderr, exit_code);
                    }
                }
                Err(e) => {
                    stderr.push_str(&format!("find: {relative_path}: {e}\n"));
                    *exit_code = 1;
                }
            }
        }
    }
}

fn compute_name(current: &str, base: &str, search_path: &str) -> String {
    if current == base {
        search_path.rsplit('/').next().unwrap_or(search_path).to_string()
    } else {
        current.rsplit('/').next().unwrap_or("").to_string()
    }
}

fn compute_relative_path(current: &str, base: &str, search_path: &str) -> String {
    if current == base {
        return search_path.to_string();
    }
    if search_path == "." {
        let suffix = if base == "/" { &current[1..] } else { &current[base.len() + 1..] };
        format!("./{suffix}")
    } else {
        let suffix = &current[base.len()..];
        format!("{search_path}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{InMemoryFs, InitialFiles};
    use crate::interpreter::sync_fs::SyncFsAdapter;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn project_fs() -> (tokio::runtime::Runtime, SyncFsAdapter) {
        let mut files = InitialFiles::new();
        files.insert("/project/src/main.rs".to_string(), "fn main() {}".to_string());
        files.insert("/project/src/lib.rs".to_string(), "pub mod foo;".to_string());
        files.insert("/project/docs/readme.txt".to_string(), "hello".to_string());
        files.insert("/project/Cargo.toml".to_string(), "[package]".to_string());
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::with_files(&files));
        let adapter = SyncFsAdapter::new(afs, runtime.handle().clone());
        (runtime, adapter)
    }

    fn run(fs: &SyncFsAdapter, args: Vec<&str>) -> ExecResult {
        let ctx = CommandContext {
            args: args.into_iter().map(String::from).collect(),
            stdin: String::new(),
            cwd: "/".to_string(),
            env: HashMap::new(),
            fs,
            exec_fn: None,
        };
        FindCommand.execute(&ctx)
    }

    fn sorted_lines(s: &str) -> Vec<&str> {
        let mut lines: Vec<&str> = s.lines().collect();
        lines.sort();
        lines
    }

    #[test]
    fn lists_every_entry_preorder() {
        let (_rt, fs) = project_fs();
        let result = run(&fs, vec!["/project"]);
        assert_eq!(result.exit_code, 0);
        let lines = sorted_lines(&result.stdout);
        assert!(lines.contains(&"/project"));
        assert!(lines.contains(&"/project/src"));
        assert!(lines.contains(&"/project/src/main.rs"));
        assert!(lines.contains(&"/project/docs/readme.txt"));
    }

    #[test]
    fn name_and_type_filter() {
        let (_rt, fs) = project_fs();
        let result = run(&fs, vec!["/project", "-name", "*.rs", "-type", "f"]);
        assert_eq!(result.exit_code, 0);
        let lines = sorted_lines(&result.stdout);
        assert_eq!(lines, vec!["/project/src/lib.rs", "/project/src/main.rs"]);
    }

    #[test]
    fn or_combinator() {
        let (_rt, fs) = project_fs();
        let result = run(&fs, vec!["/project", "-name", "*.md", "-o", "-name", "*.toml"]);
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.contains("Cargo.toml"));
    }

    #[test]
    fn missing_path_reports_and_continues() {
        let (_rt, fs) = project_fs();
        let result = run(&fs, vec!["/nonexistent"]);
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.stderr, "find: /nonexistent: No such file or directory\n");
        assert_eq!(result.stdout, "");
    }

    #[test]
    fn maxdepth_caps_descent() {
        let (_rt, fs) = project_fs();
        let result = run(&fs, vec!["/project", "-maxdepth", "1"]);
        assert_eq!(result.exit_code, 0);
        let lines = sorted_lines(&result.stdout);
        assert!(lines.contains(&"/project/Cargo.toml"));
        assert!(!lines.contains(&"/project/src/main.rs"));
    }

    #[test]
    fn mindepth_excludes_shallow_entries() {
        let (_rt, fs) = project_fs();
        let result = run(&fs, vec!["/project", "-mindepth", "1", "-type", "d"]);
        assert_eq!(result.exit_code, 0);
        let lines = sorted_lines(&result.stdout);
        assert!(!lines.contains(&"/project"));
        assert!(lines.contains(&"/project/src"));
    }

    #[test]
    fn unknown_predicate_errors() {
        let (_rt, fs) = project_fs();
        let result = run(&fs, vec!["/project", "-bogus"]);
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("unknown predicate"));
    }

    #[test]
    fn bad_type_argument_errors() {
        let (_rt, fs) = project_fs();
        let result = run(&fs, vec!["/project", "-type", "z"]);
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("Unknown argument to -type"));
    }
}
