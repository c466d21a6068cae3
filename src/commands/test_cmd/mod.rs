//! `test`/`[`: condition evaluation, trimmed to what a virtual filesystem
//! supports: no `-L`/`-h` (no symlink concept) and `-r`/`-w`/`-x` fold down
//! to plain existence checks.

use crate::commands::types::{Command, CommandContext};
use crate::interpreter::types::ExecResult;

pub struct TestCommand;

impl Command for TestCommand {
    fn name(&self) -> &'static str {
        "test"
    }

    fn execute(&self, ctx: &CommandContext) -> ExecResult {
        let args = &ctx.args;
        if args.is_empty() {
            return ExecResult::new("", "", 1);
        }

        let args: Vec<&str> = if args[0] == "[" {
            if args.last().map(|s| s.as_str()) != Some("]") {
                return ExecResult::new("", "test: missing ']'\n", 1);
            }
            args[1..args.len() - 1].iter().map(|s| s.as_str()).collect()
        } else {
            args.iter().map(|s| s.as_str()).collect()
        };

        if args.is_empty() {
            return ExecResult::new("", "", 1);
        }

        let exit_code = if evaluate_expression(&args, ctx) { 0 } else { 1 };
        ExecResult::new("", "", exit_code)
    }
}

pub struct BracketCommand;

impl Command for BracketCommand {
    fn name(&self) -> &'static str {
        "["
    }

    fn execute(&self, ctx: &CommandContext) -> ExecResult {
        if ctx.args.last().map(|s| s.as_str()) != Some("]") {
            return ExecResult::new("", "[: missing ']'\n", 1);
        }
        let args: Vec<&str> = ctx.args[..ctx.args.len() - 1].iter().map(|s| s.as_str()).collect();
        if args.is_empty() {
            return ExecResult::new("", "", 1);
        }
        let exit_code = if evaluate_expression(&args, ctx) { 0 } else { 1 };
        ExecResult::new("", "", exit_code)
    }
}

fn evaluate_expression(args: &[&str], ctx: &CommandContext) -> bool {
    if args.len() == 1 {
        return !args[0].is_empty();
    }

    if args[0] == "!" {
        return !evaluate_expression(&args[1..], ctx);
    }

    if args.len() >= 3 {
        for (i, &op) in args.iter().enumerate().skip(1) {
            match op {
                "-a" => return evaluate_expression(&args[..i], ctx) && evaluate_expression(&args[i + 1..], ctx),
                "-o" => return evaluate_expression(&args[..i], ctx) || evaluate_expression(&args[i + 1..], ctx),
                _ => {}
            }
        }
    }

    if args.len() == 3 {
        let (left, op, right) = (args[0], args[1], args[2]);
        match op {
            "=" | "==" => return left == right,
            "!=" => return left != right,
            "-eq" => return left.parse::<i64>().unwrap_or(0) == right.parse::<i64>().unwrap_or(0),
            "-ne" => return left.parse::<i64>().unwrap_or(0) != right.parse::<i64>().unwrap_or(0),
            "-lt" => return left.parse::<i64>().unwrap_or(0) < right.parse::<i64>().unwrap_or(0),
            "-le" => return left.parse::<i64>().unwrap_or(0) <= right.parse::<i64>().unwrap_or(0),
            "-gt" => return left.parse::<i64>().unwrap_or(0) > right.parse::<i64>().unwrap_or(0),
            "-ge" => return left.parse::<i64>().unwrap_or(0) >= right.parse::<i64>().unwrap_or(0),
            _ => {}
        }
    }

    if args.len() == 2 {
        let (op, operand) = (args[0], args[1]);
        match op {
            "-z" => return operand.is_empty(),
            "-n" => return !operand.is_empty(),
            "-e" | "-r" | "-w" | "-x" => {
                let path = ctx.fs.resolve_path(&ctx.cwd, operand);
                return ctx.fs.exists(&path);
            }
            "-f" => {
                let path = ctx.fs.resolve_path(&ctx.cwd, operand);
                return ctx.fs.stat(&path).map(|s| s.is_file).unwrap_or(false);
            }
            "-d" => {
                let path = ctx.fs.resolve_path(&ctx.cwd, operand);
                return ctx.fs.stat(&path).map(|s| s.is_dir).unwrap_or(false);
            }
            "-s" => {
                let path = ctx.fs.resolve_path(&ctx.cwd, operand);
                return ctx.fs.stat(&path).map(|s| s.size > 0).unwrap_or(false);
            }
            _ => {}
        }
    }

    false
}
