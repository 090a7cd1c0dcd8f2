//! The `n`, `m`, `k` loop nest.

use lw_ir::{IndexExpr, KernelBuilder, LoopVar, Stmt};

use crate::config::LoweringOptions;
use crate::error::Result;
use crate::shape::{extent, ShapeInfo};

/// Induction variables and bounds of one GEMM loop nest.
///
/// Order is fixed: `n` outermost, then `m`, with the `k` reduction innermost
/// so the per-element accumulator only lives across the `k` loop. Statements
/// are built inside-out: callers construct the body first and wrap it.
#[derive(Debug, Clone)]
pub struct LoopNest {
    pub n: LoopVar,
    pub m: LoopVar,
    pub k: LoopVar,
    n_bound: IndexExpr,
    m_bound: IndexExpr,
    k_bound: IndexExpr,
}

impl LoopNest {
    pub fn new(
        builder: &mut KernelBuilder,
        info: &ShapeInfo,
        options: &LoweringOptions,
    ) -> Result<Self> {
        let n_bound = extent(&info.result_dims[0])?;
        let m_bound = extent(&info.result_dims[1])?;
        let k_bound = extent(&info.k)?;
        Ok(Self {
            n: builder.loop_var(options.row_var.clone()),
            m: builder.loop_var(options.col_var.clone()),
            k: builder.loop_var(options.reduction_var.clone()),
            n_bound,
            m_bound,
            k_bound,
        })
    }

    /// Current values of `(n, m, k)` as index expressions.
    pub fn indices(&self) -> (IndexExpr, IndexExpr, IndexExpr) {
        (self.n.into(), self.m.into(), self.k.into())
    }

    /// `for k in 0..K { body }`
    pub fn reduction(&self, body: Vec<Stmt>) -> Stmt {
        Stmt::range(self.k, self.k_bound.clone(), body)
    }

    /// `for n in 0..N { for m in 0..M { body } }`
    pub fn output(&self, body: Vec<Stmt>) -> Stmt {
        let inner = Stmt::range(self.m, self.m_bound.clone(), body);
        Stmt::range(self.n, self.n_bound.clone(), vec![inner])
    }
}
