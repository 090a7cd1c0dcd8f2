use half::f16;

use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::scalar::Scalar;

/// CPU-side flat element storage.
#[derive(Debug, Clone, PartialEq)]
pub enum CpuStorage {
    /// 32-bit floating point storage.
    F32(Vec<f32>),
    /// 16-bit floating point storage.
    F16(Vec<f16>),
}

impl CpuStorage {
    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        match self {
            CpuStorage::F32(v) => v.len(),
            CpuStorage::F16(v) => v.len(),
        }
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create zero-filled storage for the given dtype and element count.
    pub fn zeros(dtype: DType, n: usize) -> Self {
        match dtype {
            DType::F32 => CpuStorage::F32(vec![0.0; n]),
            DType::F16 => CpuStorage::F16(vec![f16::ZERO; n]),
        }
    }

    /// Create storage from an f32 vector.
    pub fn from_f32_vec(data: Vec<f32>) -> Self {
        CpuStorage::F32(data)
    }

    /// Returns the dtype of this storage.
    pub fn dtype(&self) -> DType {
        match self {
            CpuStorage::F32(_) => DType::F32,
            CpuStorage::F16(_) => DType::F16,
        }
    }

    /// Read element `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<Scalar> {
        match self {
            CpuStorage::F32(v) => v.get(i).map(|x| Scalar::F32(*x)),
            CpuStorage::F16(v) => v.get(i).map(|x| Scalar::F16(*x)),
        }
    }

    /// Write element `i`. The value must already have this storage's dtype.
    pub fn set(&mut self, i: usize, value: Scalar) -> Result<()> {
        let len = self.len();
        let expected = self.dtype();
        let out_of_bounds = || TensorError::IndexOutOfBounds {
            index: vec![i],
            shape: vec![len],
        };
        match (self, value) {
            (CpuStorage::F32(v), Scalar::F32(x)) => *v.get_mut(i).ok_or_else(out_of_bounds)? = x,
            (CpuStorage::F16(v), Scalar::F16(x)) => *v.get_mut(i).ok_or_else(out_of_bounds)? = x,
            (_, other) => {
                return Err(TensorError::DTypeMismatch {
                    expected,
                    got: other.dtype(),
                })
            }
        }
        Ok(())
    }

    /// Copy the elements out as f32, widening half-precision values.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            CpuStorage::F32(v) => v.clone(),
            CpuStorage::F16(v) => v.iter().map(|x| x.to_f32()).collect(),
        }
    }

    /// Convert to another dtype, rounding when narrowing.
    pub fn cast(&self, dtype: DType) -> CpuStorage {
        match (self, dtype) {
            (CpuStorage::F32(_), DType::F32) | (CpuStorage::F16(_), DType::F16) => self.clone(),
            (_, DType::F32) => CpuStorage::F32(self.to_f32_vec()),
            (CpuStorage::F32(v), DType::F16) => {
                CpuStorage::F16(v.iter().map(|x| f16::from_f32(*x)).collect())
            }
        }
    }
}
