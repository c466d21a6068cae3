//! The evaluator: ties the lexer/parser/expansion engine
//! together into something that actually runs a `Script`. Statement lists,
//! pipelines, and individual commands are each one method; `Flow` threads
//! control transfer (`break`/`continue`/`return`/budget abort) through all of
//! them exactly as `control_flow`/`functions` already expect from their
//! injected `exec` callbacks.
//!
//! Command substitution and `find -exec` both need to re-enter this engine
//! from inside a borrow that can't hand out a second `&mut InterpreterState`
//! directly: command substitution works around it by executing against a
//! disposable state snapshot (the same mechanism subshells use); `-exec`
//! works around it with a `RefCell` around the state reference.

use std::cell::RefCell;

use crate::ast::types::{
    Command, CompoundCommand, ListOp, Pipeline, Redirection, RedirectionOp, RedirectionTarget, SimpleCommand, Script,
    Statement, Word,
};
use crate::commands::{CommandContext, CommandRegistry};
use crate::interpreter::errors::{EvalResult, Flow};
use crate::interpreter::expansion::Expander;
use crate::interpreter::sync_fs::SyncFs;
use crate::interpreter::types::{ExecResult, ExecutionLimits, InterpreterState, ShellFunction};
use crate::interpreter::{builtins, command_resolution, control_flow, functions};

pub struct ExecutionEngine<'a> {
    pub fs: &'a dyn SyncFs,
    pub limits: ExecutionLimits,
    pub registry: &'a CommandRegistry,
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(fs: &'a dyn SyncFs, limits: ExecutionLimits, registry: &'a CommandRegistry) -> Self {
        Self { fs, limits, registry }
    }

    /// Runs a whole script at the top level: the only place `set -e` is
    /// checked (a deliberate simplification over bash's per-command
    /// errexit semantics — see DESIGN.md) and the only place a `Flow`
    /// reaching the outermost frame is turned into a final `ExecResult`
    /// rather than propagated further.
    pub fn execute_script(&self, state: &mut InterpreterState, script: &Script) -> ExecResult {
        let mut acc = ExecResult::ok();
        for stmt in &script.statements {
            match self.execute_statement(state, stmt) {
                Ok(result) => {
                    acc.append(&result);
                    if state.options.errexit && result.exit_code != 0 {
                        return acc;
                    }
                }
                Err(Flow::Return { code, out }) => {
                    acc.append(&out);
                    acc.exit_code = code;
                    return acc;
                }
                Err(Flow::Break { out, .. }) | Err(Flow::Continue { out, .. }) => {
                    // break/continue with no enclosing loop: bash treats this
                    // as a harmless no-op rather than an error.
                    acc.append(&out);
                }
                Err(Flow::Abort { message, out }) => {
                    acc.append(&out);
                    acc.stderr.push_str(&format!("bash: {message}\n"));
                    acc.exit_code = 1;
                    return acc;
                }
            }
        }
        acc
    }

    /// Executes a statement list, the workhorse every nested context (if/
    /// while/for/case bodies and conditions, groups, subshells, function and
    /// script bodies) runs through. `set -e` is intentionally NOT enforced
    /// here — only `execute_script`'s outermost loop does — so a failing
    /// condition inside `if`/`while` never aborts the whole script.
    pub fn execute_statements(&self, state: &mut InterpreterState, stmts: &[Statement]) -> EvalResult {
        let mut acc = ExecResult::ok();
        for stmt in stmts {
            let result = self.execute_statement(state, stmt).map_err(|f| f.prepend(&acc.stdout, &acc.stderr))?;
            acc.append(&result);
        }
        Ok(acc)
    }

    fn execute_statement(&self, state: &mut InterpreterState, stmt: &Statement) -> EvalResult {
        let mut iter = stmt.pipelines.iter();
        let first = iter.next().expect("a parsed statement always has at least one pipeline");
        let mut acc = self.execute_pipeline(state, first)?;
        state.last_exit_code = acc.exit_code;

        for (op, pipeline) in stmt.operators.iter().zip(iter) {
            let should_run = match op {
                ListOp::And => state.last_exit_code == 0,
                ListOp::Or => state.last_exit_code != 0,
                ListOp::Semi => true,
            };
            if !should_run {
                continue;
            }
            let result = self.execute_pipeline(state, pipeline).map_err(|f| f.prepend(&acc.stdout, &acc.stderr))?;
            acc.append(&result);
            state.last_exit_code = result.exit_code;
        }
        Ok(acc)
    }

    /// Stages are connected stdout -> stdin in source order; no real
    /// concurrency. Only the
    /// last stage's exit code (inverted if the pipeline is negated with
    /// `!`) and stdout survive; earlier stages' stderr is carried forward
    /// rather than discarded.
    fn execute_pipeline(&self, state: &mut InterpreterState, pipeline: &Pipeline) -> EvalResult {
        let mut current_stdin = String::new();
        let mut result = ExecResult::ok();
        let mut carried_stderr = String::new();
        let last_idx = pipeline.stages.len() - 1;

        for (i, stage) in pipeline.stages.iter().enumerate() {
            let stage_result =
                self.execute_command(state, stage, &current_stdin).map_err(|f| f.prepend("", &carried_stderr))?;
            if i == last_idx {
                result = stage_result;
            } else {
                current_stdin = stage_result.stdout;
                carried_stderr.push_str(&stage_result.stderr);
            }
        }

        result.stderr = format!("{carried_stderr}{}", result.stderr);
        if pipeline.negated {
            result.exit_code = if result.exit_code == 0 { 1 } else { 0 };
        }
        Ok(result)
    }

    fn execute_command(&self, state: &mut InterpreterState, cmd: &Command, stdin: &str) -> EvalResult {
        state.command_count += 1;
        if state.command_count > self.limits.max_command_count {
            return Err(Flow::Abort { message: "too many commands".to_string(), out: ExecResult::ok() });
        }
        match cmd {
            Command::Simple(sc) => self.execute_simple(state, sc, stdin),
            Command::Compound(cc) => self.execute_compound(state, cc),
            Command::FunctionDef(fd) => {
                state.functions.insert(fd.name.clone(), ShellFunction { body: fd.body.clone(), source_text: String::new() });
                Ok(ExecResult::ok())
            }
        }
    }

    fn execute_compound(&self, state: &mut InterpreterState, cc: &CompoundCommand) -> EvalResult {
        match cc {
            CompoundCommand::If(if_) => {
                control_flow::run_if(state, &if_.clauses, if_.else_body.as_deref(), |state, stmts| {
                    self.execute_statements(state, stmts)
                })
            }
            CompoundCommand::While(w) => {
                control_flow::run_while(state, &self.limits, &w.condition, &w.body, w.until, |state, stmts| {
                    self.execute_statements(state, stmts)
                })
            }
            CompoundCommand::For(f) => {
                let words = self.expand_fields(state, &f.words)?;
                control_flow::run_for(state, &self.limits, &f.variable, &words, &f.body, |state, stmts| {
                    self.execute_statements(state, stmts)
                })
            }
            CompoundCommand::Case(c) => {
                let subject = self.expand_value(state, &c.subject)?;
                let mut clauses = Vec::with_capacity(c.clauses.len());
                for clause in &c.clauses {
                    let mut patterns = Vec::with_capacity(clause.patterns.len());
                    for p in &clause.patterns {
                        patterns.push(self.expand_value(state, p)?);
                    }
                    clauses.push((patterns, clause.body.clone()));
                }
                control_flow::run_case(state, &subject, &clauses, |state, stmts| self.execute_statements(state, stmts))
            }
            CompoundCommand::Subshell(body) => self.run_subshell(state, body),
            CompoundCommand::Group(body) => self.execute_statements(state, body),
        }
    }

    /// `( ... )`: runs against a full clone of the state so
    /// variable/cwd/function mutations never escape, while produced
    /// stdout/stderr (and any propagating `Flow`) still surface to the
    /// caller exactly like real bash subshell output does. Budget counters
    /// are copied back so command/recursion limits still apply across the
    /// boundary.
    fn run_subshell(&self, state: &mut InterpreterState, body: &[Statement]) -> EvalResult {
        let mut sub_state = state.snapshot_for_subshell();
        let result = self.execute_statements(&mut sub_state, body);
        state.command_count = sub_state.command_count;
        state.recursion_depth = sub_state.recursion_depth;
        result
    }

    fn execute_simple(&self, state: &mut InterpreterState, sc: &SimpleCommand, stdin: &str) -> EvalResult {
        let mut expanded_assignments = Vec::with_capacity(sc.assignments.len());
        for a in &sc.assignments {
            let value = self.expand_value(state, &a.value)?;
            expanded_assignments.push((a.name.clone(), value));
        }

        let Some(name_word) = &sc.name else {
            // A bare `NAME=value [...]` command: assignments persist in the
            // current shell (no temporary scoping, since there is no
            // command to scope them to).
            for (name, value) in &expanded_assignments {
                state.set_var(name, value.clone());
            }
            let (_, diversions) = self.resolve_redirections(state, &sc.redirections, stdin)?;
            return Ok(self.apply_output_redirections(ExecResult::ok(), &diversions));
        };

        // Assignments preceding a command name are scoped to that command's
        // invocation only (bash's temporary environment), restored no
        // matter how the command finished.
        let saved: Vec<(String, Option<String>)> =
            expanded_assignments.iter().map(|(n, _)| (n.clone(), state.get_var(n))).collect();
        for (name, value) in &expanded_assignments {
            state.set_var(name, value.clone());
        }

        let mut words = Vec::with_capacity(1 + sc.args.len());
        words.push(name_word.clone());
        words.extend(sc.args.iter().cloned());

        let outcome = (|| -> EvalResult {
            let fields = self.expand_fields(state, &words)?;
            if fields.is_empty() {
                return Ok(ExecResult::ok());
            }
            let (effective_stdin, diversions) = self.resolve_redirections(state, &sc.redirections, stdin)?;
            let result = self.run_command(state, &fields[0], &fields[1..], &effective_stdin)?;
            Ok(self.apply_output_redirections(result, &diversions))
        })();

        for (name, old) in saved {
            match old {
                Some(v) => state.set_var(&name, v),
                None => state.unset_var(&name),
            }
        }

        outcome
    }

    /// Command lookup order: `break`/`continue`/`return`/
    /// `exit` are control-flow pseudo-commands resolved before anything
    /// else, then function, then evaluator built-in, then registry, then a
    /// `PATH` search that sources the found file as a script.
    fn run_command(&self, state: &mut InterpreterState, name: &str, argv: &[String], stdin: &str) -> EvalResult {
        match name {
            "break" => return Err(Flow::Break { levels: parse_level(argv), out: ExecResult::ok() }),
            "continue" => return Err(Flow::Continue { levels: parse_level(argv), out: ExecResult::ok() }),
            "return" => {
                return Err(Flow::Return { code: parse_exit_code(argv, state.last_exit_code), out: ExecResult::ok() })
            }
            // `exit` has no dedicated `Flow` variant: reaching the top of
            // `execute_script` with a `Return` ends the script with that
            // exit code anyway, which is exactly what `exit` needs (see
            // DESIGN.md).
            "exit" => {
                return Err(Flow::Return { code: parse_exit_code(argv, state.last_exit_code), out: ExecResult::ok() })
            }
            _ => {}
        }

        if let Some(func) = state.functions.get(name).cloned() {
            return functions::call(state, &self.limits, name, &func.body, argv, |state, body| {
                self.execute_statements(state, body)
            });
        }

        if builtins::is_builtin(name) {
            return Ok(builtins::dispatch(state, self.fs, name, argv, stdin));
        }

        if self.registry.contains(name) {
            let cmd = self.registry.get(name).unwrap();
            let cell = RefCell::new(state);
            let cwd = cell.borrow().cwd.clone();
            let env = cell.borrow().exported_env();
            let exec_closure = |args: &[String], input: &str| -> ExecResult {
                if args.is_empty() {
                    return ExecResult::ok();
                }
                let mut guard = cell.borrow_mut();
                let st: &mut InterpreterState = &mut *guard;
                match self.run_command(st, &args[0], &args[1..], input) {
                    Ok(r) => r,
                    Err(flow) => flow.out().clone(),
                }
            };
            let ctx = CommandContext {
                args: argv.to_vec(),
                stdin: stdin.to_string(),
                cwd,
                env,
                fs: self.fs,
                exec_fn: Some(&exec_closure),
            };
            return Ok(cmd.execute(&ctx));
        }

        let path_env = state.get_var("PATH");
        if let Some(path) = command_resolution::search_path(self.fs, path_env.as_deref(), name) {
            return self.run_script_file(state, &path, argv);
        }

        Ok(ExecResult::new("", format!("{name}: command not found\n"), 127))
    }

    /// A `PATH`-resolved file is sourced as a script with `argv` bound as
    /// positional parameters — the only executable-file semantics this
    /// in-memory shell has.
    fn run_script_file(&self, state: &mut InterpreterState, path: &str, argv: &[String]) -> EvalResult {
        let src = match self.fs.read_file(path) {
            Ok(s) => s,
            Err(e) => return Ok(ExecResult::new("", format!("bash: {path}: {e}\n"), 126)),
        };
        let script = match crate::parser::parse(&src) {
            Ok(s) => s,
            Err(e) => return Ok(ExecResult::new("", format!("bash: {path}: {e}\n"), 2)),
        };
        state.call_stack.push(crate::interpreter::types::CallFrame { positional: argv.to_vec(), locals: Default::default() });
        let result = self.execute_statements(state, &script.statements);
        state.call_stack.pop();
        match result {
            Ok(out) => Ok(out),
            Err(Flow::Return { code, out }) => Ok(ExecResult::new(out.stdout, out.stderr, code)),
            Err(other) => Err(other),
        }
    }

    /// Command substitution `$(...)`/`` `...` ``: runs in a
    /// disposable state snapshot so assignments made inside it don't leak
    /// out, matching `(...)` subshell isolation; only the budget counters
    /// are carried back, so a substitution-heavy script still trips
    /// `max_command_count`/`max_recursion_depth`.
    fn run_substitution(&self, state: &mut InterpreterState, src: &str) -> ExecResult {
        let script = match crate::parser::parse(src) {
            Ok(s) => s,
            Err(e) => return ExecResult::new("", format!("bash: {e}\n"), 2),
        };
        let mut sub_state = state.snapshot_for_subshell();
        let result = match self.execute_statements(&mut sub_state, &script.statements) {
            Ok(out) => out,
            Err(flow) => flow.out().clone(),
        };
        state.command_count = sub_state.command_count;
        state.recursion_depth = sub_state.recursion_depth;
        result
    }

    fn expand_value(&self, state: &mut InterpreterState, word: &Word) -> Result<String, Flow> {
        let mut sub = |state: &mut InterpreterState, _fs: &dyn SyncFs, src: &str| self.run_substitution(state, src);
        let mut expander = Expander { state, fs: self.fs, run_substitution: &mut sub };
        expander.expand_word_value(word)
    }

    fn expand_fields(&self, state: &mut InterpreterState, words: &[Word]) -> Result<Vec<String>, Flow> {
        let mut sub = |state: &mut InterpreterState, _fs: &dyn SyncFs, src: &str| self.run_substitution(state, src);
        let mut expander = Expander { state, fs: self.fs, run_substitution: &mut sub };
        expander.expand_words_to_fields(words)
    }

    /// Resolves the redirections attached to a simple command into an
    /// effective stdin string plus a list of output diversions to apply once
    /// the command has produced its `ExecResult`. Input redirections are
    /// resolved eagerly because they determine what the command itself sees.
    fn resolve_redirections(
        &self,
        state: &mut InterpreterState,
        redirs: &[Redirection],
        external_stdin: &str,
    ) -> Result<(String, Vec<OutputDiversion>), Flow> {
        let mut stdin = external_stdin.to_string();
        let mut diversions = Vec::new();

        for r in redirs {
            match r.op {
                RedirectionOp::Less => {
                    if let RedirectionTarget::Word(w) = &r.target {
                        let target = self.expand_value(state, w)?;
                        let path = self.fs.resolve_path(&state.cwd, &target);
                        stdin = self.fs.read_file(&path).unwrap_or_default();
                    }
                }
                RedirectionOp::TLess => {
                    if let RedirectionTarget::Word(w) = &r.target {
                        let value = self.expand_value(state, w)?;
                        stdin = format!("{value}\n");
                    }
                }
                RedirectionOp::DLess | RedirectionOp::DLessDash => {
                    if let RedirectionTarget::HereDoc(text) = &r.target {
                        let word = crate::parser::word::parse_heredoc_body(text);
                        stdin = self.expand_value(state, &word)?;
                    }
                }
                RedirectionOp::Great | RedirectionOp::DGreat => {
                    let fd = r.fd.unwrap_or(1);
                    let append = r.op == RedirectionOp::DGreat;
                    if let RedirectionTarget::Word(w) = &r.target {
                        let target = self.expand_value(state, w)?;
                        let out_target = match target.as_str() {
                            "/dev/null" => OutputTarget::Null,
                            "/dev/stdout" if fd == 2 => OutputTarget::DupStdout,
                            "/dev/stderr" if fd == 1 => OutputTarget::DupStderr,
                            _ => OutputTarget::File { path: self.fs.resolve_path(&state.cwd, &target), append },
                        };
                        diversions.push(OutputDiversion { fd, target: out_target });
                    }
                }
                RedirectionOp::AndGreat => {
                    if let RedirectionTarget::Word(w) = &r.target {
                        let target = self.expand_value(state, w)?;
                        if target == "/dev/null" {
                            diversions.push(OutputDiversion { fd: 1, target: OutputTarget::Null });
                            diversions.push(OutputDiversion { fd: 2, target: OutputTarget::Null });
                        } else {
                            let path = self.fs.resolve_path(&state.cwd, &target);
                            diversions.push(OutputDiversion { fd: 1, target: OutputTarget::File { path: path.clone(), append: false } });
                            diversions.push(OutputDiversion { fd: 2, target: OutputTarget::File { path, append: false } });
                        }
                    }
                }
            }
        }

        Ok((stdin, diversions))
    }

    /// Applies the output diversions gathered by `resolve_redirections`:
    /// fd-duplication (`>&2`-style merges expressed via `/dev/stdout`,
    /// `/dev/stderr` targets) first, then file writes/truncation against
    /// the virtual filesystem, clearing whichever stream was diverted so
    /// the returned `ExecResult` reflects only what's left on the
    /// terminal.
    fn apply_output_redirections(&self, result: ExecResult, diversions: &[OutputDiversion]) -> ExecResult {
        let mut stdout = result.stdout;
        let mut stderr = result.stderr;

        for d in diversions {
            match &d.target {
                OutputTarget::DupStdout if d.fd == 2 => {
                    stdout.push_str(&stderr);
                    stderr.clear();
                }
                OutputTarget::DupStderr if d.fd == 1 => {
                    stderr.push_str(&stdout);
                    stdout.clear();
                }
                _ => {}
            }
        }

        for d in diversions {
            match &d.target {
                OutputTarget::Null => {
                    if d.fd == 1 {
                        stdout.clear();
                    } else if d.fd == 2 {
                        stderr.clear();
                    }
                }
                OutputTarget::File { path, append } => {
                    let content = if d.fd == 1 { stdout.as_str() } else { stderr.as_str() };
                    let _ = if *append { self.fs.append_file(path, content) } else { self.fs.write_file(path, content) };
                    if d.fd == 1 {
                        stdout.clear();
                    } else {
                        stderr.clear();
                    }
                }
                _ => {}
            }
        }

        ExecResult::new(stdout, stderr, result.exit_code)
    }
}

enum OutputTarget {
    File { path: String, append: bool },
    Null,
    /// fd 2 diverted into fd 1's stream (`2>/dev/stdout` or equivalent).
    DupStdout,
    /// fd 1 diverted into fd 2's stream (`1>/dev/stderr`, `>&2`-equivalent).
    DupStderr,
}

struct OutputDiversion {
    fd: i32,
    target: OutputTarget,
}

fn parse_level(argv: &[String]) -> u32 {
    argv.first().and_then(|s| s.parse::<u32>().ok()).filter(|&n| n >= 1).unwrap_or(1)
}

fn parse_exit_code(argv: &[String], default: i32) -> i32 {
    argv.first().and_then(|s| s.parse::<i32>().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::default_registry;
    use crate::fs::InMemoryFs;
    use crate::interpreter::sync_fs::SyncFsAdapter;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn state() -> InterpreterState {
        InterpreterState::new("/".to_string(), HashMap::new(), &[])
    }

    fn run(src: &str, state: &mut InterpreterState, fs: &SyncFsAdapter, registry: &CommandRegistry) -> ExecResult {
        let engine = ExecutionEngine::new(fs, ExecutionLimits::default(), registry);
        let script = crate::parser::parse(src).unwrap();
        engine.execute_script(state, &script)
    }

    fn harness() -> (tokio::runtime::Runtime, SyncFsAdapter, CommandRegistry) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let afs: Arc<dyn crate::fs::FileSystem> = Arc::new(InMemoryFs::new());
        let adapter = SyncFsAdapter::new(afs, runtime.handle().clone());
        (runtime, adapter, default_registry())
    }

    #[test]
    fn echo_prints_and_exits_zero() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("echo hello", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn variable_assignment_and_expansion() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("X=hi; echo $X", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "hi\n");
    }

    #[test]
    fn and_or_short_circuit() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("true && echo a || echo b", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "a\n");
        let mut s2 = state();
        let result2 = run("false && echo a || echo b", &mut s2, &fs, &registry);
        assert_eq!(result2.stdout, "b\n");
    }

    #[test]
    fn if_statement_runs_matching_branch() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("if true; then echo yes; else echo no; fi", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "yes\n");
    }

    #[test]
    fn for_loop_binds_each_word() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("for x in a b c; do echo $x; done", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "a\nb\nc\n");
    }

    #[test]
    fn function_definition_and_call_with_positional_params() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("greet() { echo hi $1; }; greet world", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "hi world\n");
    }

    #[test]
    fn function_return_sets_exit_code() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("f() { return 3; }; f; echo $?", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "3\n");
    }

    #[test]
    fn subshell_does_not_leak_variable_assignment() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("(X=1); echo ${X:-unset}", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "unset\n");
    }

    #[test]
    fn command_substitution_captures_stdout() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("echo $(echo inner)", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "inner\n");
    }

    #[test]
    fn pipeline_feeds_stdout_to_next_stage_stdin() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("echo hi | cat", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "hi\n");
    }

    #[test]
    fn output_redirection_writes_to_virtual_file() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("echo hi > /out.txt", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "");
        assert_eq!(fs.read_file("/out.txt").unwrap(), "hi\n");
    }

    #[test]
    fn command_not_found_reports_127() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("totallynotreal", &mut s, &fs, &registry);
        assert_eq!(result.exit_code, 127);
        assert!(result.stderr.contains("command not found"));
    }

    #[test]
    fn break_stops_a_while_loop() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let result = run("i=0; while true; do i=$((i+1)); echo $i; if [ $i -ge 2 ]; then break; fi; done", &mut s, &fs, &registry);
        assert_eq!(result.stdout, "1\n2\n");
    }

    #[test]
    fn recursion_budget_aborts_runaway_function() {
        let (_rt, fs, registry) = harness();
        let mut s = state();
        let engine = ExecutionEngine::new(&fs, ExecutionLimits { max_recursion_depth: 5, ..ExecutionLimits::default() }, &registry);
        let script = crate::parser::parse("f() { f; }; f").unwrap();
        let result = engine.execute_script(&mut s, &script);
        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("maximum recursion depth"));
    }
}
