//! Shape resolution and validation for GEMM operands.

use log::debug;
use lw_ir::IndexExpr;
use lw_tensor::{DType, Dim, TensorType};

use crate::error::{Result, ShapeMismatchError};

/// How the bias is indexed along one result axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisAccess {
    /// The bias has the full extent; index with the loop variable.
    Direct,
    /// The bias has extent 1; index with constant 0.
    Broadcast,
    /// The bias extent is symbolic; pick between the two when the kernel runs.
    Runtime,
}

/// Bias layout relative to the `[N, M]` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiasInfo {
    /// `min(C.rank, 2)`. Only result axes in `[2 - rank, 2)` are indexed.
    pub rank: usize,
    /// Bias dimensions right-aligned to two axes, padded with 1.
    pub dims: [Dim; 2],
    /// Access kind per result axis. Axes not covered by the bias are
    /// `Broadcast`.
    pub axes: [AxisAccess; 2],
}

impl BiasInfo {
    /// Result axes the bias actually has storage dimensions for.
    pub fn covered_axes(&self) -> std::ops::Range<usize> {
        2 - self.rank..2
    }
}

/// A size relation between symbolic dimensions that only the running kernel
/// can decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimCheck {
    /// Columns of `op(A)` equal rows of `op(B)`.
    Reduction { a_cols: Dim, b_rows: Dim },
    /// A bias axis is either 1 or the full result extent.
    Bias { axis: usize, bias: Dim, result: Dim },
    /// A result axis matches the extent the graph declared for the output.
    Result {
        axis: usize,
        declared: Dim,
        result: Dim,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeInfo {
    /// `[N, M]`: rows of `op(A)`, columns of `op(B)`.
    pub result_dims: [Dim; 2],
    /// The shared reduction dimension.
    pub k: Dim,
    pub bias: Option<BiasInfo>,
    /// Relations to verify when the kernel runs, before the loop nest.
    pub checks: Vec<DimCheck>,
}

impl ShapeInfo {
    pub fn has_bias(&self) -> bool {
        self.bias.is_some()
    }
}

/// `dim` as a loop bound or index operand.
pub(crate) fn extent(dim: &Dim) -> Result<IndexExpr> {
    IndexExpr::try_from(dim).map_err(|_| ShapeMismatchError::DimOutOfRange(dim.clone()))
}

/// `(rows, cols)` of `op(x)`.
fn oriented(x: &TensorType, operand: &'static str, transposed: bool) -> Result<(Dim, Dim)> {
    let (Some(d0), Some(d1), 2) = (x.dim(0), x.dim(1), x.rank()) else {
        return Err(ShapeMismatchError::OperandRank {
            operand,
            rank: x.rank(),
        });
    };
    Ok(if transposed {
        (d1.clone(), d0.clone())
    } else {
        (d0.clone(), d1.clone())
    })
}

/// Compute result dimensions, the reduction size and the bias axis mapping.
///
/// Pure validation: nothing is allocated or emitted. Relations that cannot be
/// decided statically, such as a reduction size `K` against a different
/// symbol `J`, are accepted and recorded in [`ShapeInfo::checks`].
pub fn resolve_shapes(
    a: &TensorType,
    b: &TensorType,
    c: Option<&TensorType>,
    trans_a: bool,
    trans_b: bool,
) -> Result<ShapeInfo> {
    let (a_rows, a_cols) = oriented(a, "A", trans_a)?;
    let (b_rows, b_cols) = oriented(b, "B", trans_b)?;
    for x in [Some(a), Some(b), c].into_iter().flatten() {
        for d in x.dims() {
            extent(d)?;
        }
    }
    let mut checks = Vec::new();

    match a_cols.static_eq(&b_rows) {
        Some(true) => {}
        Some(false) => {
            return Err(ShapeMismatchError::ReductionDim {
                a_cols,
                b_rows,
            })
        }
        None => checks.push(DimCheck::Reduction {
            a_cols: a_cols.clone(),
            b_rows,
        }),
    }

    let result_dims = [a_rows, b_cols];
    let bias = c
        .map(|c| resolve_bias(c, &result_dims, &mut checks))
        .transpose()?;

    debug!(
        "gemm shapes: result [{}, {}], k = {}, bias = {:?}",
        result_dims[0],
        result_dims[1],
        a_cols,
        bias.as_ref().map(|b| b.axes)
    );
    Ok(ShapeInfo {
        result_dims,
        k: a_cols,
        bias,
        checks,
    })
}

/// Compare the type the graph declares for the output with the resolved
/// `[N, M]` result in `dtype`.
///
/// A static contradiction is an error. Axes that cannot be decided are
/// returned as checks for the running kernel.
pub fn check_declared_result(
    declared: &TensorType,
    info: &ShapeInfo,
    dtype: DType,
) -> Result<Vec<DimCheck>> {
    let resolved = || TensorType::new(info.result_dims.to_vec(), dtype);
    if declared.rank() != 2 || declared.dtype() != dtype {
        return Err(ShapeMismatchError::ResultType {
            declared: declared.clone(),
            resolved: resolved(),
        });
    }
    let mut checks = Vec::new();
    for (axis, (d, r)) in declared.dims().iter().zip(&info.result_dims).enumerate() {
        extent(d)?;
        match d.static_eq(r) {
            Some(true) => {}
            Some(false) => {
                return Err(ShapeMismatchError::ResultType {
                    declared: declared.clone(),
                    resolved: resolved(),
                })
            }
            None => checks.push(DimCheck::Result {
                axis,
                declared: d.clone(),
                result: r.clone(),
            }),
        }
    }
    Ok(checks)
}

fn resolve_bias(
    c: &TensorType,
    result_dims: &[Dim; 2],
    checks: &mut Vec<DimCheck>,
) -> Result<BiasInfo> {
    if c.rank() > 2 {
        return Err(ShapeMismatchError::BiasRank(c.rank()));
    }
    let rank = c.rank();
    let aligned = c.right_aligned(2);
    let dims = [aligned[0].clone(), aligned[1].clone()];
    let mut axes = [AxisAccess::Broadcast; 2];

    for x in 2 - rank..2 {
        axes[x] = classify_axis(x, &dims[x], &result_dims[x])?;
        let decided = dims[x].is_one() || dims[x].static_eq(&result_dims[x]) == Some(true);
        if !decided {
            checks.push(DimCheck::Bias {
                axis: x,
                bias: dims[x].clone(),
                result: result_dims[x].clone(),
            });
        }
    }
    Ok(BiasInfo { rank, dims, axes })
}

fn classify_axis(axis: usize, bias: &Dim, result: &Dim) -> Result<AxisAccess> {
    if bias.is_one() {
        return Ok(AxisAccess::Broadcast);
    }
    match (bias, bias.static_eq(result)) {
        (_, Some(true)) => Ok(AxisAccess::Direct),
        (Dim::Const(_), Some(false)) => Err(ShapeMismatchError::BiasDim {
            axis,
            bias: bias.clone(),
            result: result.clone(),
        }),
        // A constant extent > 1 against a symbolic result axis can only be valid
        // as a direct axis.
        (Dim::Const(_), None) => Ok(AxisAccess::Direct),
        (Dim::Symbol(_), _) => Ok(AxisAccess::Runtime),
    }
}
