use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// A host tensor: contiguous, row-major elements with a shape and dtype.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    storage: CpuStorage,
    shape: Shape,
}

impl Tensor {
    /// Create a new f32 tensor from data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {:?} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor {
            storage: CpuStorage::from_f32_vec(data),
            shape,
        }
    }

    /// Create a zero-filled tensor with the given shape and dtype.
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let n = shape.numel();
        Tensor {
            storage: CpuStorage::zeros(dtype, n),
            shape,
        }
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Elements widened to f32 in row-major order.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.storage.to_f32_vec()
    }

    /// Read the element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Result<Scalar> {
        let offset = self.shape.offset(index)?;
        self.storage
            .get(offset)
            .ok_or_else(|| TensorError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.dims().to_vec(),
            })
    }

    /// Write the element at a multi-index.
    pub fn set(&mut self, index: &[usize], value: Scalar) -> Result<()> {
        let offset = self.shape.offset(index)?;
        self.storage.set(offset, value)
    }

    /// Convert to another dtype.
    pub fn cast(&self, dtype: DType) -> Tensor {
        Tensor {
            storage: self.storage.cast(dtype),
            shape: self.shape.clone(),
        }
    }

    /// Materialized transpose of a 2-D tensor.
    pub fn transpose(&self) -> Result<Tensor> {
        if self.shape.ndim() != 2 {
            return Err(TensorError::RankMismatch {
                expected: 2,
                got: self.shape.ndim(),
            });
        }
        let (rows, cols) = (self.shape.dim(0), self.shape.dim(1));
        let mut out = Tensor::zeros(Shape::new(vec![cols, rows]), self.dtype());
        for r in 0..rows {
            for c in 0..cols {
                out.set(&[c, r], self.get(&[r, c])?)?;
            }
        }
        Ok(out)
    }
}
