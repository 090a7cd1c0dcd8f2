//! `lw-gemm` - Lowers a GEMM operator node into explicit loop code.
//!
//! Computes `Y = alpha * op(A) * op(B) + beta * C` where `op(X)` is `X` or
//! its transpose and `C` is an optional bias broadcastable to `[N, M]`.
//!
//! The lowering runs in a fixed order: shapes are resolved and validated
//! (`shape`), the output buffer is requested, the `n`/`m`/`k` loop nest is
//! built (`loops`), operand addresses are computed per transpose flag and
//! broadcast axis (`access`), and the reduction plus epilogue are emitted
//! (`emit`). A shape failure happens before any allocation or emission.
//! Size relations between symbols that cannot be decided statically become
//! runtime checks placed ahead of the loop nest.

pub mod access;
pub mod attributes;
pub mod config;
pub mod emit;
pub mod error;
pub mod lower;
pub mod loops;
pub mod pattern;
pub mod shape;

pub use access::AccessFunctions;
pub use attributes::GemmAttributes;
pub use config::LoweringOptions;
pub use error::{Result, ShapeMismatchError};
pub use lower::{lower_gemm, GemmOperand, GemmOperands, LoweredGemm};
pub use loops::LoopNest;
pub use pattern::GemmLowering;
pub use shape::{resolve_shapes, AxisAccess, BiasInfo, DimCheck, ShapeInfo};
