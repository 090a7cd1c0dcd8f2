//! `lw-ir` - Loop-level IR for lowered tensor operators.
//!
//! Kernels are explicit trees of statements over flat multi-dimensional
//! buffers: counted loops, scalar locals, loads, stores and runtime checks. Statements are
//! plain values; a lowering builds them inside-out and hands the finished
//! block to a `KernelBuilder`, which owns handle allocation.
//!
//! - `expr`: index and scalar expressions
//! - `stmt`: statements
//! - `kernel`: finished kernels and buffer declarations
//! - `builder`: `KernelBuilder` and the `BufferAllocator` contract
//! - `interp`: a reference interpreter used to check lowered code

pub mod builder;
pub mod display;
pub mod error;
pub mod expr;
pub mod interp;
pub mod kernel;
pub mod stmt;

pub use builder::{BufferAllocator, KernelBuilder};
pub use error::{IrError, Result};
pub use expr::{IndexExpr, Predicate, ScalarExpr};
pub use interp::Interpreter;
pub use kernel::{BufferDecl, BufferId, BufferKind, Kernel, LocalId, LoopVar};
pub use stmt::Stmt;
