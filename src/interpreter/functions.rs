//! Function invocation: pushes a `CallFrame` binding
//! positional parameters for the duration of the call, enforces the
//! recursion-depth budget, and translates a `return` `Flow` into a normal
//! result.

use std::collections::HashMap;

use crate::ast::types::Statement;
use crate::interpreter::errors::{EvalResult, Flow};
use crate::interpreter::types::{CallFrame, ExecResult, ExecutionLimits, InterpreterState};

/// Runs `body` with `args` bound as positional parameters. `execute_body` is
/// the evaluator's statement-list runner, injected to avoid a dependency
/// cycle between this module and `execution_engine`.
pub fn call(
    state: &mut InterpreterState,
    limits: &ExecutionLimits,
    name: &str,
    body: &[Statement],
    args: &[String],
    execute_body: impl FnOnce(&mut InterpreterState, &[Statement]) -> EvalResult,
) -> EvalResult {
    state.recursion_depth += 1;
    if state.recursion_depth > limits.max_recursion_depth {
        state.recursion_depth -= 1;
        return Err(Flow::Abort { message: format!("{name}: maximum recursion depth exceeded"), out: ExecResult::ok() });
    }

    state.call_stack.push(CallFrame { positional: args.to_vec(), locals: HashMap::new() });
    let result = execute_body(state, body);
    state.call_stack.pop();
    state.recursion_depth -= 1;

    match result {
        Ok(out) => Ok(out),
        Err(Flow::Return { code, out }) => Ok(ExecResult::new(out.stdout, out.stderr, code)),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> InterpreterState {
        InterpreterState::new("/".to_string(), HashMap::new(), &[])
    }

    #[test]
    fn binds_positional_parameters_for_the_call() {
        let mut s = state();
        let limits = ExecutionLimits::default();
        let result = call(&mut s, &limits, "f", &[], &["a".to_string(), "b".to_string()], |state, _body| {
            assert_eq!(state.call_stack.last().unwrap().positional, vec!["a", "b"]);
            Ok(ExecResult::new("ok\n", "", 0))
        });
        assert_eq!(result.unwrap().stdout, "ok\n");
        assert!(s.call_stack.is_empty());
    }

    #[test]
    fn return_flow_becomes_a_normal_result() {
        let mut s = state();
        let limits = ExecutionLimits::default();
        let result =
            call(&mut s, &limits, "f", &[], &[], |_, _| Err(Flow::Return { code: 7, out: ExecResult::new("x\n", "", 0) }));
        let out = result.unwrap();
        assert_eq!(out.exit_code, 7);
        assert_eq!(out.stdout, "x\n");
    }

    #[test]
    fn exceeding_recursion_depth_aborts() {
        let mut s = state();
        let limits = ExecutionLimits { max_recursion_depth: 1, ..ExecutionLimits::default() };
        s.recursion_depth = 1;
        let result = call(&mut s, &limits, "f", &[], &[], |_, _| Ok(ExecResult::ok()));
        match result {
            Err(Flow::Abort { message, .. }) => assert!(message.contains("maximum recursion depth")),
            _ => panic!("expected abort"),
        }
    }

    #[test]
    fn non_return_flow_propagates_and_still_pops_frame() {
        let mut s = state();
        let limits = ExecutionLimits::default();
        let result = call(&mut s, &limits, "f", &[], &[], |_, _| {
            Err(Flow::Break { levels: 1, out: ExecResult::ok() })
        });
        assert!(matches!(result, Err(Flow::Break { .. })));
        assert!(s.call_stack.is_empty());
    }
}
