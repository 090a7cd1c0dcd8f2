use lw_graph::{AttributeValue, Attributes};

/// Scalar attributes of a GEMM node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemmAttributes {
    /// Scale applied to `op(A) * op(B)`.
    pub alpha: f32,
    /// Scale applied to the bias `C`.
    pub beta: f32,
    /// Use `A^T` instead of `A`.
    pub trans_a: bool,
    /// Use `B^T` instead of `B`.
    pub trans_b: bool,
}

impl Default for GemmAttributes {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 0.0,
            trans_a: false,
            trans_b: false,
        }
    }
}

impl GemmAttributes {
    /// Parse attributes from a node.
    ///
    /// Reads the following keys, each optional:
    /// - `alpha` (float, default 1.0)
    /// - `beta` (float, default 0.0)
    /// - `transA` (int flag, default 0)
    /// - `transB` (int flag, default 0)
    pub fn from_attributes(attrs: &Attributes) -> lw_graph::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            alpha: attrs.get_f32_or("alpha", defaults.alpha)?,
            beta: attrs.get_f32_or("beta", defaults.beta)?,
            trans_a: attrs.get_flag_or("transA", defaults.trans_a)?,
            trans_b: attrs.get_flag_or("transB", defaults.trans_b)?,
        })
    }

    /// The node attributes that parse back to `self`.
    pub fn to_attributes(&self) -> Attributes {
        Attributes::new()
            .with("alpha", AttributeValue::Float(self.alpha))
            .with("beta", AttributeValue::Float(self.beta))
            .with("transA", AttributeValue::Int(self.trans_a as i64))
            .with("transB", AttributeValue::Int(self.trans_b as i64))
    }
}
