//! Control-flow-as-result types: `break`, `continue`, `return`,
//! and budget exhaustion are not exceptional conditions in the host-language
//! sense, so they're modeled as an evaluator result variant threaded through
//! recursive evaluation, rather than as thrown errors.

use thiserror::Error;

use crate::interpreter::types::ExecResult;

/// Non-local control transfer produced while evaluating a statement,
/// pipeline, or command. Every variant carries the output accumulated
/// before the transfer, so it is never lost as the error unwinds to the
/// enclosing loop/function/top-level frame.
#[derive(Debug, Clone, Error)]
pub enum Flow {
    #[error("break")]
    Break { levels: u32, out: ExecResult },
    #[error("continue")]
    Continue { levels: u32, out: ExecResult },
    #[error("return")]
    Return { code: i32, out: ExecResult },
    #[error("abort: {message}")]
    Abort { message: String, out: ExecResult },
}

impl Flow {
    pub fn out(&self) -> &ExecResult {
        match self {
            Flow::Break { out, .. } | Flow::Continue { out, .. } | Flow::Return { out, .. } | Flow::Abort { out, .. } => out,
        }
    }

    /// Prepend output accumulated in an enclosing frame before this flow
    /// keeps propagating outward.
    pub fn prepend(mut self, stdout: &str, stderr: &str) -> Self {
        let merge = |out: &mut ExecResult| {
            out.stdout = format!("{}{}", stdout, out.stdout);
            out.stderr = format!("{}{}", stderr, out.stderr);
        };
        match &mut self {
            Flow::Break { out, .. } | Flow::Continue { out, .. } | Flow::Return { out, .. } | Flow::Abort { out, .. } => merge(out),
        }
        self
    }
}

pub type EvalResult = Result<ExecResult, Flow>;
