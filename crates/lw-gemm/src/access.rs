//! Access functions: logical `(n, m, k)` indices to operand coordinates.

use lw_ir::{IndexExpr, Predicate};

use crate::attributes::GemmAttributes;
use crate::error::Result;
use crate::shape::{extent, AxisAccess, ShapeInfo};

/// Per-operand address computation for one lowering.
///
/// Transpose flags and bias axis kinds are fixed at construction; each call
/// only substitutes the current loop indices.
#[derive(Debug, Clone)]
pub struct AccessFunctions<'a> {
    info: &'a ShapeInfo,
    trans_a: bool,
    trans_b: bool,
    /// Bias extents per result axis, compared against 1 on runtime axes.
    bias_extents: [IndexExpr; 2],
}

impl<'a> AccessFunctions<'a> {
    pub fn new(info: &'a ShapeInfo, attrs: &GemmAttributes) -> Result<Self> {
        let bias_extents = match &info.bias {
            Some(bias) => [extent(&bias.dims[0])?, extent(&bias.dims[1])?],
            None => [IndexExpr::Const(1), IndexExpr::Const(1)],
        };
        Ok(Self {
            info,
            trans_a: attrs.trans_a,
            trans_b: attrs.trans_b,
            bias_extents,
        })
    }

    /// `A[n, k]`, or `A[k, n]` when transposed.
    pub fn a(&self, n: &IndexExpr, k: &IndexExpr) -> Vec<IndexExpr> {
        if self.trans_a {
            vec![k.clone(), n.clone()]
        } else {
            vec![n.clone(), k.clone()]
        }
    }

    /// `B[k, m]`, or `B[m, k]` when transposed.
    pub fn b(&self, k: &IndexExpr, m: &IndexExpr) -> Vec<IndexExpr> {
        if self.trans_b {
            vec![m.clone(), k.clone()]
        } else {
            vec![k.clone(), m.clone()]
        }
    }

    /// `C` coordinates for result element `(n, m)`; `None` without a bias.
    ///
    /// One coordinate per bias dimension: the loop index on a direct axis,
    /// `0` on a broadcast axis, and `select(dim > 1, index, 0)` on an axis
    /// whose extent is only known at run time.
    pub fn bias(&self, n: &IndexExpr, m: &IndexExpr) -> Option<Vec<IndexExpr>> {
        let bias = self.info.bias.as_ref()?;
        let result = [n, m];
        Some(
            bias.covered_axes()
                .map(|x| match bias.axes[x] {
                    AxisAccess::Direct => result[x].clone(),
                    AxisAccess::Broadcast => IndexExpr::zero(),
                    AxisAccess::Runtime => IndexExpr::select(
                        Predicate::Gt(self.bias_extents[x].clone(), IndexExpr::Const(1)),
                        result[x].clone(),
                        IndexExpr::zero(),
                    ),
                })
                .collect(),
        )
    }

    /// Output coordinates, always `[n, m]`.
    pub fn result(&self, n: &IndexExpr, m: &IndexExpr) -> Vec<IndexExpr> {
        vec![n.clone(), m.clone()]
    }
}
