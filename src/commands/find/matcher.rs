//! Evaluates a parsed find expression against one visited node.
//! `-exec` is the one predicate that needs more than the static `EvalContext`
//! — it has to invoke a command — so it takes an `exec_fn` callback and
//! treats the invoked command's success as the predicate's truth value
//! rather than threading its real exit code through.

use super::types::*;
use crate::commands::types::ExecFn;

pub fn evaluate(expr: &Expression, ctx: &EvalContext) -> bool {
    evaluate_with_exec(expr, ctx, None)
}

pub fn evaluate_with_exec(expr: &Expression, ctx: &EvalContext, exec_fn: Option<&ExecFn>) -> bool {
    match expr {
        Expression::True => true,
        Expression::Name { pattern, case_insensitive } => {
            if *case_insensitive {
                crate::glob::matches_ci(pattern, &ctx.name)
            } else {
                crate::glob::matches(pattern, &ctx.name)
            }
        }
        Expression::Type(file_type) => match file_type {
            FileType::File => ctx.is_file,
            FileType::Directory => ctx.is_directory,
        },
        Expression::Exec { command } => {
            let Some(exec_fn) = exec_fn else { return false };
            let argv: Vec<String> =
                command.iter().map(|part| if part == "{}" { ctx.relative_path.clone() } else { part.clone() }).collect();
            if argv.is_empty() {
                return false;
            }
            exec_fn(&argv, "").exit_code == 0
        }
        Expression::Not(inner) => !evaluate_with_exec(inner, ctx, exec_fn),
        Expression::And(left, right) => {
            evaluate_with_exec(left, ctx, exec_fn) && evaluate_with_exec(right, ctx, exec_fn)
        }
        Expression::Or(left, right) => {
            evaluate_with_exec(left, ctx, exec_fn) || evaluate_with_exec(right, ctx, exec_fn)
        }
    }
}
