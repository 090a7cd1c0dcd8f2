use thiserror::Error;

use crate::dtype::DType;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("dtype mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: DType, got: DType },
    #[error("expected a tensor of rank {expected}, got rank {got}")]
    RankMismatch { expected: usize, got: usize },
    #[error("index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },
    #[error("cannot broadcast shapes {a:?} and {b:?}")]
    BroadcastError { a: Vec<usize>, b: Vec<usize> },
    #[error("matmul dimension mismatch: [{m}x{k}] @ [{k2}x{n}]")]
    MatmulMismatch {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
    },
    #[error("symbolic dimension '{0}' has no binding")]
    UnboundSymbol(String),
}

pub type Result<T> = std::result::Result<T, TensorError>;
