//! `if`/`while`/`until`/`for`/`case` execution. Conditions and
//! bodies are run through an injected `exec` callback so this module stays
//! free of a dependency on `execution_engine`; `break`/`continue` are
//! consumed here when their level count reaches this loop, otherwise
//! decremented and re-propagated outward exactly as `Flow::prepend` expects.

use crate::ast::types::Statement;
use crate::interpreter::errors::{EvalResult, Flow};
use crate::interpreter::types::{ExecResult, ExecutionLimits, InterpreterState};

pub fn run_if(
    state: &mut InterpreterState,
    clauses: &[(Vec<Statement>, Vec<Statement>)],
    else_body: Option<&[Statement]>,
    mut exec: impl FnMut(&mut InterpreterState, &[Statement]) -> EvalResult,
) -> EvalResult {
    let mut acc = ExecResult::ok();
    for (condition, body) in clauses {
        let cond_result = exec(state, condition)?;
        acc.append(&cond_result);
        if cond_result.exit_code == 0 {
            let out = exec(state, body).map_err(|f| f.prepend(&acc.stdout, &acc.stderr))?;
            acc.append(&out);
            return Ok(acc);
        }
    }
    if let Some(body) = else_body {
        let out = exec(state, body).map_err(|f| f.prepend(&acc.stdout, &acc.stderr))?;
        acc.append(&out);
    }
    Ok(acc)
}

pub fn run_while(
    state: &mut InterpreterState,
    limits: &ExecutionLimits,
    condition: &[Statement],
    body: &[Statement],
    until: bool,
    mut exec: impl FnMut(&mut InterpreterState, &[Statement]) -> EvalResult,
) -> EvalResult {
    let mut acc = ExecResult::ok();
    let mut iterations: u64 = 0;
    loop {
        let cond_result = match exec(state, condition) {
            Ok(r) => r,
            Err(f) => return Err(f.prepend(&acc.stdout, &acc.stderr)),
        };
        acc.append(&cond_result);
        let condition_true = cond_result.exit_code == 0;
        if condition_true == until {
            break;
        }

        iterations += 1;
        if iterations > limits.max_loop_iterations {
            return Err(Flow::Abort { message: "too many iterations".to_string(), out: acc });
        }

        match exec(state, body) {
            Ok(out) => acc.append(&out),
            Err(Flow::Break { levels, out }) => {
                acc.append(&out);
                if levels <= 1 {
                    break;
                }
                return Err(Flow::Break { levels: levels - 1, out }.prepend(&acc.stdout, &acc.stderr));
            }
            Err(Flow::Continue { levels, out }) => {
                acc.append(&out);
                if levels <= 1 {
                    continue;
                }
                return Err(Flow::Continue { levels: levels - 1, out }.prepend(&acc.stdout, &acc.stderr));
            }
            Err(other) => return Err(other.prepend(&acc.stdout, &acc.stderr)),
        }
    }
    Ok(acc)
}

/// `for v in w1 w2 …`: the already-expanded word list counts toward the
/// loop cap the same way a `while` iteration does.
pub fn run_for(
    state: &mut InterpreterState,
    limits: &ExecutionLimits,
    variable: &str,
    words: &[String],
    body: &[Statement],
    mut exec: impl FnMut(&mut InterpreterState, &[Statement]) -> EvalResult,
) -> EvalResult {
    let mut acc = ExecResult::ok();
    for (i, word) in words.iter().enumerate() {
        let iterations = i as u64 + 1;
        if iterations > limits.max_loop_iterations {
            return Err(Flow::Abort { message: "too many iterations".to_string(), out: acc });
        }
        state.set_var(variable, word.clone());

        match exec(state, body) {
            Ok(out) => acc.append(&out),
            Err(Flow::Break { levels, out }) => {
                acc.append(&out);
                if levels <= 1 {
                    break;
                }
                return Err(Flow::Break { levels: levels - 1, out }.prepend(&acc.stdout, &acc.stderr));
            }
            Err(Flow::Continue { levels, out }) => {
                acc.append(&out);
                if levels <= 1 {
                    continue;
                }
                return Err(Flow::Continue { levels: levels - 1, out }.prepend(&acc.stdout, &acc.stderr));
            }
            Err(other) => return Err(other.prepend(&acc.stdout, &acc.stderr)),
        }
    }
    Ok(acc)
}

/// `case subject in pat1) body1;; …`: `patterns` are already-expanded glob
/// strings per clause, matched in source order against `subject`; the first
/// clause with a matching pattern runs and the rest are skipped.
pub fn run_case(
    state: &mut InterpreterState,
    subject: &str,
    clauses: &[(Vec<String>, Vec<Statement>)],
    mut exec: impl FnMut(&mut InterpreterState, &[Statement]) -> EvalResult,
) -> EvalResult {
    for (patterns, body) in clauses {
        if patterns.iter().any(|p| crate::glob::matches(p, subject)) {
            return exec(state, body);
        }
    }
    Ok(ExecResult::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn state() -> InterpreterState {
        InterpreterState::new("/".to_string(), HashMap::new(), &[])
    }

    #[test]
    fn if_runs_first_true_clause() {
        let mut s = state();
        let clauses = vec![(vec![], vec![])];
        let result = run_if(&mut s, &clauses, None, |_, _| Ok(ExecResult::new("body\n", "", 0)));
        assert_eq!(result.unwrap().stdout, "body\n");
    }

    #[test]
    fn while_loop_respects_iteration_budget() {
        let mut s = state();
        let limits = ExecutionLimits { max_loop_iterations: 2, ..ExecutionLimits::default() };
        let result = run_while(&mut s, &limits, &[], &[], false, |_, _| Ok(ExecResult::new("", "", 0)));
        match result {
            Err(Flow::Abort { message, .. }) => assert_eq!(message, "too many iterations"),
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[test]
    fn break_stops_the_loop_immediately() {
        let mut s = state();
        let limits = ExecutionLimits::default();
        let mut calls = 0;
        let result = run_while(&mut s, &limits, &[], &[], false, |_, _| {
            calls += 1;
            if calls == 1 {
                Err(Flow::Break { levels: 1, out: ExecResult::ok() })
            } else {
                panic!("loop body ran again after break");
            }
        });
        assert!(result.is_ok());
    }

    #[test]
    fn for_binds_variable_per_word() {
        let mut s = state();
        let limits = ExecutionLimits::default();
        let mut seen = Vec::new();
        let result = run_for(&mut s, &limits, "x", &["a".to_string(), "b".to_string()], &[], |state, _| {
            seen.push(state.get_var("x").unwrap());
            Ok(ExecResult::ok())
        });
        assert!(result.is_ok());
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn case_runs_first_matching_clause() {
        let mut s = state();
        let clauses = vec![
            (vec!["foo".to_string()], vec![]),
            (vec!["*.rs".to_string()], vec![]),
        ];
        let mut ran = Vec::new();
        let result = run_case(&mut s, "main.rs", &clauses, |_, body| {
            ran.push(body.len());
            Ok(ExecResult::ok())
        });
        assert!(result.is_ok());
        assert_eq!(ran.len(), 1);
    }
}
