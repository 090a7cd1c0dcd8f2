use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TensorError};

/// A single dimension size: either known at compile time or a named runtime value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dim {
    Const(usize),
    Symbol(String),
}

impl Dim {
    /// Create a symbolic dimension.
    pub fn symbol(name: impl Into<String>) -> Self {
        Dim::Symbol(name.into())
    }

    /// Returns the size if it is a compile-time constant.
    pub fn as_const(&self) -> Option<usize> {
        match self {
            Dim::Const(v) => Some(*v),
            Dim::Symbol(_) => None,
        }
    }

    /// True only for the constant `1`; a symbol is never statically one.
    pub fn is_one(&self) -> bool {
        matches!(self, Dim::Const(1))
    }

    /// Decides equality without runtime information.
    ///
    /// Returns `Some(true)` for the same constant or the same symbol,
    /// `Some(false)` for two different constants and `None` when at least
    /// one side is symbolic and the names differ.
    pub fn static_eq(&self, other: &Dim) -> Option<bool> {
        match (self, other) {
            (Dim::Const(a), Dim::Const(b)) => Some(a == b),
            (Dim::Symbol(a), Dim::Symbol(b)) if a == b => Some(true),
            _ => None,
        }
    }

    /// Resolve to a concrete size using the given bindings.
    pub fn resolve(&self, bindings: &SymbolBindings) -> Result<usize> {
        match self {
            Dim::Const(v) => Ok(*v),
            Dim::Symbol(name) => bindings
                .get(name)
                .ok_or_else(|| TensorError::UnboundSymbol(name.clone())),
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Const(v) => write!(f, "{}", v),
            Dim::Symbol(name) => write!(f, "{}", name),
        }
    }
}

impl From<usize> for Dim {
    fn from(v: usize) -> Self {
        Dim::Const(v)
    }
}

impl From<&str> for Dim {
    fn from(name: &str) -> Self {
        Dim::Symbol(name.to_string())
    }
}

/// Runtime values for symbolic dimensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolBindings {
    values: HashMap<String, usize>,
}

impl SymbolBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `value`. Returns self for builder-style usage.
    pub fn with(mut self, name: impl Into<String>, value: usize) -> Self {
        self.bind(name, value);
        self
    }

    pub fn bind(&mut self, name: impl Into<String>, value: usize) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.values.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_eq() {
        assert_eq!(Dim::Const(3).static_eq(&Dim::Const(3)), Some(true));
        assert_eq!(Dim::Const(3).static_eq(&Dim::Const(4)), Some(false));
        assert_eq!(Dim::symbol("K").static_eq(&Dim::symbol("K")), Some(true));
        assert_eq!(Dim::symbol("K").static_eq(&Dim::symbol("J")), None);
        assert_eq!(Dim::symbol("K").static_eq(&Dim::Const(4)), None);
    }

    #[test]
    fn test_is_one() {
        assert!(Dim::Const(1).is_one());
        assert!(!Dim::Const(2).is_one());
        assert!(!Dim::symbol("one").is_one());
    }

    #[test]
    fn test_resolve() {
        let bindings = SymbolBindings::new().with("N", 7);
        assert_eq!(Dim::Const(2).resolve(&bindings).unwrap(), 2);
        assert_eq!(Dim::symbol("N").resolve(&bindings).unwrap(), 7);
        assert_eq!(
            Dim::symbol("M").resolve(&bindings),
            Err(TensorError::UnboundSymbol("M".to_string()))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Dim::Const(5).to_string(), "5");
        assert_eq!(Dim::from("batch").to_string(), "batch");
    }
}
