//! `lw-tensor` - Shape and type system for the loop-lowering workspace.
//!
//! This crate provides:
//! - `Dim` and `TensorType`, the symbolic shape metadata graph values carry
//! - A concrete `Shape` with strides and broadcasting
//! - Data type definitions (F32, F16) and typed `Scalar` values
//! - A host `Tensor` backed by `CpuStorage`
//! - A straightforward reference GEMM used to cross-check lowered code

pub mod dim;
pub mod dtype;
pub mod error;
pub mod reference;
pub mod scalar;
pub mod shape;
pub mod storage;
pub mod tensor;
pub mod tensor_type;

// Re-export primary types at the crate root for convenience.
pub use dim::{Dim, SymbolBindings};
pub use dtype::DType;
pub use error::{Result, TensorError};
pub use scalar::Scalar;
pub use shape::Shape;
pub use storage::CpuStorage;
pub use tensor::Tensor;
pub use tensor_type::TensorType;
