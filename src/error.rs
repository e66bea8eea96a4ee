use thiserror::Error;

use crate::ops::Op;

/// Errors raised while building the expression graph.
///
/// Floating-point domain problems such as division by zero are not errors;
/// they show up as `inf` or `NaN` values in the graph instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradError {
    /// An operator was given the wrong number of operands.
    #[error("invalid operand: `{op}` takes {expected} operand(s), got {actual}")]
    InvalidOperand {
        op: Op,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, GradError>;
