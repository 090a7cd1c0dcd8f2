//! Accumulation and epilogue statements for one GEMM.

use lw_ir::{BufferId, IndexExpr, LocalId, ScalarExpr, Stmt};
use lw_tensor::DType;

use crate::access::AccessFunctions;
use crate::attributes::GemmAttributes;
use crate::loops::LoopNest;

/// Buffers a GEMM reads and writes.
#[derive(Debug, Clone, Copy)]
pub struct GemmBuffers {
    pub a: BufferId,
    pub b: BufferId,
    pub c: Option<BufferId>,
    pub output: BufferId,
}

pub struct GemmEmitter<'a> {
    access: &'a AccessFunctions<'a>,
    buffers: GemmBuffers,
    attrs: GemmAttributes,
    dtype: DType,
    acc: LocalId,
}

impl<'a> GemmEmitter<'a> {
    pub fn new(
        access: &'a AccessFunctions<'a>,
        buffers: GemmBuffers,
        attrs: GemmAttributes,
        dtype: DType,
        acc: LocalId,
    ) -> Self {
        Self {
            access,
            buffers,
            attrs,
            dtype,
            acc,
        }
    }

    /// The complete loop nest.
    ///
    /// ```text
    /// for n in 0..N {
    ///   for m in 0..M {
    ///     let acc = 0;
    ///     for k in 0..K { acc = acc + A[..] * B[..]; }
    ///     Y[n, m] = alpha * acc (+ beta * C[..]);
    ///   }
    /// }
    /// ```
    pub fn emit(&self, nest: &LoopNest) -> Stmt {
        let (n, m, k) = nest.indices();
        let body = vec![
            self.init(),
            nest.reduction(vec![self.accumulate(&n, &m, &k)]),
            self.epilogue(&n, &m),
        ];
        nest.output(body)
    }

    /// `let acc = 0`, in the output element type.
    fn init(&self) -> Stmt {
        Stmt::Let {
            local: self.acc,
            dtype: self.dtype,
            init: self.constant(0.0),
        }
    }

    /// `acc = acc + A[..] * B[..]`
    fn accumulate(&self, n: &IndexExpr, m: &IndexExpr, k: &IndexExpr) -> Stmt {
        let a = ScalarExpr::load(self.buffers.a, self.access.a(n, k));
        let b = ScalarExpr::load(self.buffers.b, self.access.b(k, m));
        Stmt::Assign {
            local: self.acc,
            value: ScalarExpr::Local(self.acc).add(a.mul(b)),
        }
    }

    /// `Y[n, m] = alpha * acc`, plus `beta * C[..]` with a bias.
    fn epilogue(&self, n: &IndexExpr, m: &IndexExpr) -> Stmt {
        let scaled = self
            .constant(self.attrs.alpha as f64)
            .mul(ScalarExpr::Local(self.acc));
        let value = match (self.buffers.c, self.access.bias(n, m)) {
            (Some(c), Some(indices)) => {
                let bias = self
                    .constant(self.attrs.beta as f64)
                    .mul(ScalarExpr::load(c, indices));
                scaled.add(bias)
            }
            _ => scaled,
        };
        Stmt::Store {
            buffer: self.buffers.output,
            indices: self.access.result(n, m),
            value,
        }
    }

    fn constant(&self, value: f64) -> ScalarExpr {
        ScalarExpr::constant(value, self.dtype)
    }
}
