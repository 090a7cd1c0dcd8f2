use thiserror::Error;

use lw_tensor::{DType, Dim, TensorType};

/// The only way a GEMM lowering fails. Raised during shape resolution,
/// before anything is allocated or emitted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeMismatchError {
    #[error("operand {operand} must have rank 2, got rank {rank}")]
    OperandRank { operand: &'static str, rank: usize },
    #[error("reduction dimension mismatch: op(A) has {a_cols} columns but op(B) has {b_rows} rows")]
    ReductionDim { a_cols: Dim, b_rows: Dim },
    #[error("bias of rank {0} is not supported, at most 2")]
    BiasRank(usize),
    #[error("bias dimension {bias} on result axis {axis} must be 1 or {result}")]
    BiasDim { axis: usize, bias: Dim, result: Dim },
    #[error("operand {operand} has element type {got}, expected {expected}")]
    ElementType {
        operand: &'static str,
        expected: DType,
        got: DType,
    },
    #[error("dimension {0} does not fit the index range")]
    DimOutOfRange(Dim),
    #[error("output declared as {declared} but the product is {resolved}")]
    ResultType {
        declared: TensorType,
        resolved: TensorType,
    },
}

pub type Result<T> = std::result::Result<T, ShapeMismatchError>;
