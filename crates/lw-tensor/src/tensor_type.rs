use std::fmt;

use crate::dim::{Dim, SymbolBindings};
use crate::dtype::DType;
use crate::error::Result;
use crate::shape::Shape;

/// Static type of a graph value: element type plus (possibly symbolic) dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorType {
    dims: Vec<Dim>,
    dtype: DType,
}

impl TensorType {
    pub fn new(dims: Vec<Dim>, dtype: DType) -> Self {
        TensorType { dims, dtype }
    }

    /// Fully static type from concrete sizes.
    pub fn from_sizes(sizes: &[usize], dtype: DType) -> Self {
        TensorType {
            dims: sizes.iter().copied().map(Dim::Const).collect(),
            dtype,
        }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// Returns dimension `i`, or `None` if `i >= rank()`.
    pub fn dim(&self, i: usize) -> Option<&Dim> {
        self.dims.get(i)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Right-align the dimensions to `width`, padding on the left with `1`.
    ///
    /// Dimensions beyond `width` (counted from the left) are dropped, so
    /// callers that care about higher ranks must check `rank()` first.
    pub fn right_aligned(&self, width: usize) -> Vec<Dim> {
        let mut out = Vec::with_capacity(width);
        for i in 0..width {
            let from_right = width - 1 - i;
            if from_right < self.dims.len() {
                out.push(self.dims[self.dims.len() - 1 - from_right].clone());
            } else {
                out.push(Dim::Const(1));
            }
        }
        out
    }

    /// Resolve every dimension into a concrete `Shape`.
    pub fn resolve(&self, bindings: &SymbolBindings) -> Result<Shape> {
        let dims = self
            .dims
            .iter()
            .map(|d| d.resolve(bindings))
            .collect::<Result<Vec<_>>>()?;
        Ok(Shape::new(dims))
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.dtype)?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}
