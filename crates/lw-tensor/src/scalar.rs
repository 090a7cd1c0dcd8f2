use half::f16;

use crate::dtype::DType;
use crate::error::{Result, TensorError};

/// A single element value tagged with its dtype.
///
/// Arithmetic is performed in the element's own precision: adding two
/// `F16` values rounds to half precision after every operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    F32(f32),
    F16(f16),
}

impl Scalar {
    /// Convert a literal into the given dtype.
    pub fn from_f64(dtype: DType, v: f64) -> Self {
        match dtype {
            DType::F32 => Scalar::F32(v as f32),
            DType::F16 => Scalar::F16(f16::from_f64(v)),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            Scalar::F32(_) => DType::F32,
            Scalar::F16(_) => DType::F16,
        }
    }

    pub fn to_f32(&self) -> f32 {
        match self {
            Scalar::F32(v) => *v,
            Scalar::F16(v) => v.to_f32(),
        }
    }

    pub fn add(self, rhs: Scalar) -> Result<Scalar> {
        match (self, rhs) {
            (Scalar::F32(a), Scalar::F32(b)) => Ok(Scalar::F32(a + b)),
            (Scalar::F16(a), Scalar::F16(b)) => Ok(Scalar::F16(a + b)),
            (a, b) => Err(TensorError::DTypeMismatch {
                expected: a.dtype(),
                got: b.dtype(),
            }),
        }
    }

    pub fn mul(self, rhs: Scalar) -> Result<Scalar> {
        match (self, rhs) {
            (Scalar::F32(a), Scalar::F32(b)) => Ok(Scalar::F32(a * b)),
            (Scalar::F16(a), Scalar::F16(b)) => Ok(Scalar::F16(a * b)),
            (a, b) => Err(TensorError::DTypeMismatch {
                expected: a.dtype(),
                got: b.dtype(),
            }),
        }
    }
}
