//! Reference GEMM on host tensors.
//!
//! Straightforward loops optimized for correctness rather than speed. The
//! lowered loop code is checked against this in tests.

use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::tensor::Tensor;

/// `alpha * op(a) * op(b) + beta * c`, computed in f32.
///
/// `c` is right-aligned against the `[n, m]` result and may broadcast along
/// any axis where its size is 1.
pub fn gemm(
    a: &Tensor,
    b: &Tensor,
    c: Option<&Tensor>,
    alpha: f32,
    beta: f32,
    trans_a: bool,
    trans_b: bool,
) -> Result<Tensor> {
    for t in [a, b] {
        if t.shape().ndim() != 2 {
            return Err(TensorError::RankMismatch {
                expected: 2,
                got: t.shape().ndim(),
            });
        }
    }

    let (a_rows, a_cols) = oriented(a.shape(), trans_a);
    let (b_rows, b_cols) = oriented(b.shape(), trans_b);
    if a_cols != b_rows {
        return Err(TensorError::MatmulMismatch {
            m: a_rows,
            k: a_cols,
            k2: b_rows,
            n: b_cols,
        });
    }

    let out_shape = Shape::new(vec![a_rows, b_cols]);
    let c = c.map(|c| c.cast(DType::F32));
    if let Some(c) = &c {
        let broadcast = Shape::broadcast_shape(&out_shape, c.shape())?;
        if broadcast != out_shape {
            return Err(TensorError::BroadcastError {
                a: out_shape.dims().to_vec(),
                b: c.shape().dims().to_vec(),
            });
        }
    }

    let a = a.to_f32_vec();
    let b = b.to_f32_vec();
    let mut y = vec![0.0f32; a_rows * b_cols];
    for i in 0..a_rows {
        for j in 0..b_cols {
            let mut sum = 0.0f32;
            for p in 0..a_cols {
                let av = if trans_a { a[p * a_rows + i] } else { a[i * a_cols + p] };
                let bv = if trans_b { b[j * b_rows + p] } else { b[p * b_cols + j] };
                sum += av * bv;
            }
            let mut value = alpha * sum;
            if let Some(c) = &c {
                value += beta * bias_at(c, i, j)?;
            }
            y[i * b_cols + j] = value;
        }
    }
    Ok(Tensor::new(y, out_shape))
}

/// (rows, cols) of `op(x)` for a 2-D shape.
fn oriented(shape: &Shape, transposed: bool) -> (usize, usize) {
    if transposed {
        (shape.dim(1), shape.dim(0))
    } else {
        (shape.dim(0), shape.dim(1))
    }
}

fn bias_at(c: &Tensor, i: usize, j: usize) -> Result<f32> {
    let dims = c.shape().dims();
    let coords = [i, j];
    let index: Vec<usize> = dims
        .iter()
        .enumerate()
        .map(|(axis, &d)| {
            let result_axis = 2 - dims.len() + axis;
            if d == 1 {
                0
            } else {
                coords[result_axis]
            }
        })
        .collect();
    Ok(c.get(&index)?.to_f32())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn t(data: &[f32], dims: &[usize]) -> Tensor {
        Tensor::new(data.to_vec(), Shape::new(dims.to_vec()))
    }

    #[test]
    fn test_plain_matmul() {
        let a = t(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let b = t(&[5.0, 6.0, 7.0, 8.0], &[2, 2]);
        let y = gemm(&a, &b, None, 1.0, 0.0, false, false).unwrap();
        assert_eq!(y.to_f32_vec(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_bias_and_scaling() {
        let a = t(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let b = t(&[5.0, 6.0, 7.0, 8.0], &[2, 2]);
        let c = t(&[1.0, 1.0, 1.0, 1.0], &[2, 2]);
        let y = gemm(&a, &b, Some(&c), 2.0, 3.0, false, false).unwrap();
        assert_eq!(y.to_f32_vec(), vec![41.0, 47.0, 89.0, 103.0]);
    }

    #[test]
    fn test_transposed_a() {
        let a = t(&[1.0, 3.0, 2.0, 4.0], &[2, 2]);
        let b = t(&[5.0, 6.0, 7.0, 8.0], &[2, 2]);
        let y = gemm(&a, &b, None, 1.0, 0.0, true, false).unwrap();
        assert_eq!(y.to_f32_vec(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_row_bias_broadcast() {
        let a = t(&[1.0, 0.0, 0.0, 1.0], &[2, 2]);
        let b = t(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        let c = t(&[10.0, 20.0], &[2]);
        let y = gemm(&a, &b, Some(&c), 1.0, 1.0, false, false).unwrap();
        assert_eq!(y.to_f32_vec(), vec![11.0, 22.0, 13.0, 24.0]);
    }

    #[test]
    fn test_half_inputs_are_widened() {
        let a = t(&[0.1, 0.2, 0.3, 0.4], &[2, 2]).cast(DType::F16);
        let b = t(&[1.0, 0.0, 0.0, 1.0], &[2, 2]);
        let y = gemm(&a, &b, None, 0.5, 0.0, false, false).unwrap();
        assert_eq!(y.dtype(), DType::F32);
        for (got, want) in y.to_f32_vec().iter().zip([0.05f32, 0.1, 0.15, 0.2]) {
            assert_relative_eq!(*got, want, max_relative = 1e-3);
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = t(&[1.0, 2.0, 3.0], &[1, 3]);
        let b = t(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
        assert!(matches!(
            gemm(&a, &b, None, 1.0, 0.0, false, false),
            Err(TensorError::MatmulMismatch { k: 3, k2: 2, .. })
        ));
    }

    #[test]
    fn test_bad_bias() {
        let a = t(&[1.0; 4], &[2, 2]);
        let b = t(&[1.0; 4], &[2, 2]);
        let c = t(&[1.0; 3], &[3]);
        assert!(gemm(&a, &b, Some(&c), 1.0, 1.0, false, false).is_err());
    }
}
