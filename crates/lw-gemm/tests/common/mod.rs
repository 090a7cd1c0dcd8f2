//! Helpers shared by the GEMM integration tests: graph construction, lowering
//! through the rewrite driver and execution on the interpreter.

#![allow(dead_code)]

use std::collections::HashMap;

use lw_gemm::{GemmAttributes, GemmLowering};
use lw_graph::{DriverOptions, FailurePolicy, Graph, LoweredProgram, RewriteDriver};
use lw_ir::Interpreter;
use lw_tensor::{DType, Dim, Shape, SymbolBindings, Tensor, TensorType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn matrix(rows: usize, cols: usize, data: &[f32]) -> Tensor {
    Tensor::new(data.to_vec(), Shape::new(vec![rows, cols]))
}

pub fn tensor(dims: &[usize], data: &[f32]) -> Tensor {
    Tensor::new(data.to_vec(), Shape::new(dims.to_vec()))
}

pub fn random_tensor(rng: &mut StdRng, dims: &[usize]) -> Tensor {
    let n = dims.iter().product();
    let data: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Tensor::new(data, Shape::new(dims.to_vec()))
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn static_type(t: &Tensor, dtype: DType) -> TensorType {
    TensorType::from_sizes(t.shape().dims(), dtype)
}

/// Operand types for a single GEMM graph. `None` for `c` omits the bias.
pub struct GemmTypes {
    pub a: TensorType,
    pub b: TensorType,
    pub c: Option<TensorType>,
}

/// `Y = Gemm(A, B[, C])` with `Y` marked as the graph output.
pub fn gemm_graph(types: &GemmTypes, attrs: &GemmAttributes) -> Graph {
    let mut g = Graph::new();
    let a = g.add_input("A", types.a.clone());
    let b = g.add_input("B", types.b.clone());
    let c = types.c.as_ref().map(|c| g.add_input("C", c.clone()));

    let rows = types.a.dim(if attrs.trans_a { 1 } else { 0 }).cloned();
    let cols = types.b.dim(if attrs.trans_b { 0 } else { 1 }).cloned();
    let out_ty = TensorType::new(
        vec![
            rows.unwrap_or_else(|| Dim::symbol("N")),
            cols.unwrap_or_else(|| Dim::symbol("M")),
        ],
        types.a.dtype(),
    );
    let (_, outputs) = g
        .add_node(
            "Gemm",
            "gemm0",
            vec![Some(a), Some(b), c],
            vec![("Y".to_string(), out_ty)],
            attrs.to_attributes(),
        )
        .unwrap();
    g.mark_output(outputs[0]);
    g
}

pub fn driver(policy: FailurePolicy) -> RewriteDriver {
    RewriteDriver::new(DriverOptions {
        failure_policy: policy,
        kernel_name: "gemm".to_string(),
    })
    .with(Box::new(GemmLowering::default()))
}

pub fn lower(types: &GemmTypes, attrs: &GemmAttributes) -> LoweredProgram {
    let mut g = gemm_graph(types, attrs);
    driver(FailurePolicy::Abort).run(&mut g).unwrap()
}

pub fn execute(
    program: &LoweredProgram,
    bindings: SymbolBindings,
    a: &Tensor,
    b: &Tensor,
    c: Option<&Tensor>,
) -> lw_ir::Result<Tensor> {
    let mut inputs = HashMap::new();
    inputs.insert("A".to_string(), a.clone());
    inputs.insert("B".to_string(), b.clone());
    if let Some(c) = c {
        inputs.insert("C".to_string(), c.clone());
    }
    let mut outputs = Interpreter::new(&program.kernel)
        .with_bindings(bindings)
        .run(&inputs)?;
    Ok(outputs.remove("Y").unwrap())
}

/// Lower with fully static f32 types and run.
pub fn run_gemm(a: &Tensor, b: &Tensor, c: Option<&Tensor>, attrs: GemmAttributes) -> Tensor {
    let types = GemmTypes {
        a: static_type(a, DType::F32),
        b: static_type(b, DType::F32),
        c: c.map(|c| static_type(c, DType::F32)),
    };
    let program = lower(&types, &attrs);
    execute(&program, SymbolBindings::new(), a, b, c).unwrap()
}

pub fn reference(a: &Tensor, b: &Tensor, c: Option<&Tensor>, attrs: GemmAttributes) -> Tensor {
    lw_tensor::reference::gemm(a, b, c, attrs.alpha, attrs.beta, attrs.trans_a, attrs.trans_b)
        .unwrap()
}
