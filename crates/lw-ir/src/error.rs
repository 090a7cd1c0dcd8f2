use thiserror::Error;

use lw_tensor::{Shape, TensorError};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("unknown buffer #{0}")]
    UnknownBuffer(usize),
    #[error("no input bound for buffer '{0}'")]
    MissingInput(String),
    #[error("input '{name}' has shape {got}, kernel expects {expected}")]
    InputShapeMismatch {
        name: String,
        expected: Shape,
        got: Shape,
    },
    #[error("loop variable '{0}' used outside its loop")]
    UnboundLoopVar(String),
    #[error("local '{0}' read before it was declared")]
    UndefinedLocal(String),
    #[error("negative index {value} into buffer '{buffer}'")]
    NegativeIndex { buffer: String, value: i64 },
    #[error("extent {0} does not fit a signed index")]
    IndexOverflow(usize),
    #[error("runtime check failed: {0}")]
    CheckFailed(String),
    #[error("tensor error: {0}")]
    Tensor(#[from] TensorError),
}

pub type Result<T> = std::result::Result<T, IrError>;
