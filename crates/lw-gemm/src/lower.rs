use log::debug;
use lw_ir::{BufferAllocator, BufferId, IndexExpr, KernelBuilder, Predicate, Stmt};
use lw_tensor::TensorType;

use crate::access::AccessFunctions;
use crate::attributes::GemmAttributes;
use crate::config::LoweringOptions;
use crate::emit::{GemmBuffers, GemmEmitter};
use crate::error::{Result, ShapeMismatchError};
use crate::loops::LoopNest;
use crate::shape::{check_declared_result, extent, resolve_shapes, DimCheck, ShapeInfo};

/// An operand: its static type and the buffer holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct GemmOperand {
    pub ty: TensorType,
    pub buffer: BufferId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GemmOperands {
    pub a: GemmOperand,
    pub b: GemmOperand,
    /// Optional bias, right-aligned against the result.
    pub c: Option<GemmOperand>,
}

/// Result of a successful lowering. The statements are not yet committed to
/// the kernel: runtime size checks first, then the loop nest.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredGemm {
    pub stmts: Vec<Stmt>,
    pub output: BufferId,
    pub shape: ShapeInfo,
}

/// Lower one GEMM into a loop nest writing a freshly allocated `[N, M]` buffer.
///
/// On error nothing has been allocated or emitted and `builder` is unchanged.
/// The element type of the output is that of `A`; `B` and `C` must match it.
/// When `declared` is given it must agree with the resolved output type.
pub fn lower_gemm(
    operands: &GemmOperands,
    attrs: &GemmAttributes,
    output_name: &str,
    declared: Option<&TensorType>,
    options: &LoweringOptions,
    builder: &mut KernelBuilder,
) -> Result<LoweredGemm> {
    let mut info = resolve_shapes(
        &operands.a.ty,
        &operands.b.ty,
        operands.c.as_ref().map(|c| &c.ty),
        attrs.trans_a,
        attrs.trans_b,
    )?;

    let dtype = operands.a.ty.dtype();
    let others = [("B", Some(&operands.b)), ("C", operands.c.as_ref())];
    for (operand, x) in others {
        if let Some(x) = x {
            if x.ty.dtype() != dtype {
                return Err(ShapeMismatchError::ElementType {
                    operand,
                    expected: dtype,
                    got: x.ty.dtype(),
                });
            }
        }
    }
    if let Some(declared) = declared {
        let checks = check_declared_result(declared, &info, dtype)?;
        info.checks.extend(checks);
    }

    let mut stmts = info
        .checks
        .iter()
        .map(|check| check_stmt(output_name, check))
        .collect::<Result<Vec<Stmt>>>()?;
    let access = AccessFunctions::new(&info, attrs)?;

    let output = builder.allocate(
        output_name,
        TensorType::new(info.result_dims.to_vec(), dtype),
    );
    let nest = LoopNest::new(builder, &info, options)?;
    let acc = builder.local(options.accumulator.clone());

    let buffers = GemmBuffers {
        a: operands.a.buffer,
        b: operands.b.buffer,
        c: operands.c.as_ref().map(|c| c.buffer),
        output,
    };
    stmts.push(GemmEmitter::new(&access, buffers, *attrs, dtype, acc).emit(&nest));

    debug!(
        "lowered gemm '{}': {} statements, {} runtime checks, trans_a={}, trans_b={}, bias={}",
        output_name,
        stmts.iter().map(Stmt::count).sum::<usize>(),
        info.checks.len(),
        attrs.trans_a,
        attrs.trans_b,
        info.has_bias()
    );
    Ok(LoweredGemm {
        stmts,
        output,
        shape: info,
    })
}

fn check_stmt(output_name: &str, check: &DimCheck) -> Result<Stmt> {
    Ok(match check {
        DimCheck::Reduction { a_cols, b_rows } => Stmt::Check {
            cond: Predicate::Eq(extent(a_cols)?, extent(b_rows)?),
            message: format!(
                "gemm '{}': reduction size {} of A does not match {} of B",
                output_name, a_cols, b_rows
            ),
        },
        DimCheck::Bias { axis, bias, result } => Stmt::Check {
            cond: Predicate::Eq(extent(bias)?, IndexExpr::Const(1))
                .or(Predicate::Eq(extent(bias)?, extent(result)?)),
            message: format!(
                "gemm '{}': bias extent {} on axis {} is neither 1 nor {}",
                output_name, bias, axis, result
            ),
        },
        DimCheck::Result {
            axis,
            declared,
            result,
        } => Stmt::Check {
            cond: Predicate::Eq(extent(declared)?, extent(result)?),
            message: format!(
                "gemm '{}': result extent {} on axis {} does not match declared {}",
                output_name, result, axis, declared
            ),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lw_tensor::{DType, Dim};

    fn operands(
        builder: &mut KernelBuilder,
        a: TensorType,
        b: TensorType,
        c: Option<TensorType>,
    ) -> GemmOperands {
        let a = GemmOperand {
            buffer: builder.declare_input("A", a.clone()),
            ty: a,
        };
        let b = GemmOperand {
            buffer: builder.declare_input("B", b.clone()),
            ty: b,
        };
        let c = c.map(|c| GemmOperand {
            buffer: builder.declare_input("C", c.clone()),
            ty: c,
        });
        GemmOperands { a, b, c }
    }

    fn render(builder: KernelBuilder, lowered: LoweredGemm) -> String {
        let mut builder = builder;
        builder.mark_output(lowered.output);
        builder.push(lowered.stmts);
        builder.finish().to_string()
    }

    #[test]
    fn test_render_with_bias_and_transpose() {
        let mut builder = KernelBuilder::new("gemm");
        let ops = operands(
            &mut builder,
            TensorType::from_sizes(&[3, 2], DType::F32),
            TensorType::from_sizes(&[3, 4], DType::F32),
            Some(TensorType::from_sizes(&[1, 4], DType::F32)),
        );
        let attrs = GemmAttributes {
            alpha: 2.0,
            beta: 0.5,
            trans_a: true,
            trans_b: false,
        };
        let lowered = lower_gemm(
            &ops,
            &attrs,
            "Y",
            None,
            &LoweringOptions::default(),
            &mut builder,
        )
        .unwrap();
        let expected = "\
kernel gemm(A: f32[3, 2], B: f32[3, 4], C: f32[1, 4]) -> (Y) {
  alloc Y: f32[2, 4]
  for n in 0..2 {
    for m in 0..4 {
      let acc: f32 = 0;
      for k in 0..3 {
        acc = acc + A[k, n] * B[k, m];
      }
      Y[n, m] = 2 * acc + 0.5 * C[0, m];
    }
  }
}
";
        assert_eq!(render(builder, lowered), expected);
    }

    #[test]
    fn test_render_symbolic_without_bias() {
        let mut builder = KernelBuilder::new("gemm");
        let ops = operands(
            &mut builder,
            TensorType::new(vec![Dim::symbol("N"), Dim::symbol("K")], DType::F32),
            TensorType::new(vec![Dim::symbol("M"), Dim::symbol("K")], DType::F32),
            None,
        );
        let attrs = GemmAttributes {
            trans_b: true,
            ..GemmAttributes::default()
        };
        let lowered = lower_gemm(
            &ops,
            &attrs,
            "Y",
            None,
            &LoweringOptions::default(),
            &mut builder,
        )
        .unwrap();
        let expected = "\
kernel gemm(A: f32[N, K], B: f32[M, K]) -> (Y) {
  alloc Y: f32[N, M]
  for n in 0..N {
    for m in 0..M {
      let acc: f32 = 0;
      for k in 0..K {
        acc = acc + A[n, k] * B[m, k];
      }
      Y[n, m] = 1 * acc;
    }
  }
}
";
        assert_eq!(render(builder, lowered), expected);
    }

    #[test]
    fn test_render_runtime_bias_axis() {
        let mut builder = KernelBuilder::new("gemm");
        let ops = operands(
            &mut builder,
            TensorType::from_sizes(&[2, 2], DType::F32),
            TensorType::from_sizes(&[2, 2], DType::F32),
            Some(TensorType::new(vec![Dim::symbol("R")], DType::F32)),
        );
        let lowered = lower_gemm(
            &ops,
            &GemmAttributes::default(),
            "Y",
            None,
            &LoweringOptions::default(),
            &mut builder,
        )
        .unwrap();
        let text = render(builder, lowered);
        assert!(text.contains("  check (R == 1 || R == 2), "));
        assert!(text.contains("Y[n, m] = 1 * acc + 0 * C[select(R > 1, m, 0)];"));
    }

    #[test]
    fn test_undecided_reduction_is_checked_first() {
        let mut builder = KernelBuilder::new("gemm");
        let ops = operands(
            &mut builder,
            TensorType::new(vec![Dim::symbol("N"), Dim::symbol("K")], DType::F32),
            TensorType::new(vec![Dim::symbol("J"), Dim::Const(4)], DType::F32),
            None,
        );
        let lowered = lower_gemm(
            &ops,
            &GemmAttributes::default(),
            "Y",
            None,
            &LoweringOptions::default(),
            &mut builder,
        )
        .unwrap();
        assert_eq!(lowered.stmts.len(), 2);
        assert_eq!(
            lowered.stmts[0],
            Stmt::Check {
                cond: Predicate::Eq(IndexExpr::Symbol("K".into()), IndexExpr::Symbol("J".into())),
                message: "gemm 'Y': reduction size K of A does not match J of B".to_string(),
            }
        );
        assert!(matches!(lowered.stmts[1], Stmt::Loop { .. }));
    }

    #[test]
    fn test_failure_leaves_builder_untouched() {
        let mut builder = KernelBuilder::new("gemm");
        let ops = operands(
            &mut builder,
            TensorType::from_sizes(&[2, 3], DType::F32),
            TensorType::from_sizes(&[2, 3], DType::F32),
            None,
        );
        let before = builder.clone().finish();
        let err = lower_gemm(
            &ops,
            &GemmAttributes::default(),
            "Y",
            None,
            &LoweringOptions::default(),
            &mut builder,
        )
        .unwrap_err();
        assert!(matches!(err, ShapeMismatchError::ReductionDim { .. }));
        assert_eq!(builder.finish(), before);
    }

    #[test]
    fn test_declared_output_type() {
        let mut builder = KernelBuilder::new("gemm");
        let ops = operands(
            &mut builder,
            TensorType::from_sizes(&[2, 3], DType::F32),
            TensorType::from_sizes(&[3, 4], DType::F32),
            None,
        );
        let before = builder.clone().finish();
        let declared = TensorType::from_sizes(&[2, 2], DType::F32);
        let err = lower_gemm(
            &ops,
            &GemmAttributes::default(),
            "H",
            Some(&declared),
            &LoweringOptions::default(),
            &mut builder,
        )
        .unwrap_err();
        assert!(matches!(err, ShapeMismatchError::ResultType { .. }));
        assert_eq!(builder.clone().finish(), before);

        let declared = TensorType::new(vec![Dim::Const(2), Dim::symbol("P")], DType::F32);
        let lowered = lower_gemm(
            &ops,
            &GemmAttributes::default(),
            "H",
            Some(&declared),
            &LoweringOptions::default(),
            &mut builder,
        )
        .unwrap();
        assert_eq!(
            lowered.stmts[0],
            Stmt::Check {
                cond: Predicate::Eq(IndexExpr::Symbol("P".into()), IndexExpr::Const(4)),
                message: "gemm 'H': result extent 4 on axis 1 does not match declared P"
                    .to_string(),
            }
        );
    }

    #[test]
    fn test_element_type_mismatch() {
        let mut builder = KernelBuilder::new("gemm");
        let ops = operands(
            &mut builder,
            TensorType::from_sizes(&[2, 2], DType::F32),
            TensorType::from_sizes(&[2, 2], DType::F16),
            None,
        );
        let err = lower_gemm(
            &ops,
            &GemmAttributes::default(),
            "Y",
            None,
            &LoweringOptions::default(),
            &mut builder,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ShapeMismatchError::ElementType {
                operand: "B",
                expected: DType::F32,
                got: DType::F16,
            }
        );
    }

    #[test]
    fn test_custom_names() {
        let mut builder = KernelBuilder::new("gemm");
        let ops = operands(
            &mut builder,
            TensorType::from_sizes(&[1, 1], DType::F16),
            TensorType::from_sizes(&[1, 1], DType::F16),
            None,
        );
        let options = LoweringOptions {
            row_var: "i".into(),
            col_var: "j".into(),
            reduction_var: "p".into(),
            accumulator: "sum".into(),
        };
        let lowered = lower_gemm(
            &ops,
            &GemmAttributes::default(),
            "out",
            None,
            &options,
            &mut builder,
        )
        .unwrap();
        let text = render(builder, lowered);
        assert!(text.contains("let sum: f16 = 0;"));
        assert!(text.contains("sum = sum + A[i, p] * B[p, j];"));
        assert!(text.contains("out[i, j] = 1 * sum;"));
    }
}
