use std::collections::BTreeMap;

use crate::error::{GraphError, Result};

/// A node attribute value, as carried by operator descriptors.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Float(f32),
    Int(i64),
    String(String),
    Floats(Vec<f32>),
    Ints(Vec<i64>),
}

impl AttributeValue {
    fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::Float(_) => "float",
            AttributeValue::Int(_) => "int",
            AttributeValue::String(_) => "string",
            AttributeValue::Floats(_) => "floats",
            AttributeValue::Ints(_) => "ints",
        }
    }
}

/// Named attributes of a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<String, AttributeValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute. Returns self for builder-style usage.
    pub fn with(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    /// Read a float attribute, falling back to `default` when absent.
    ///
    /// Integer attributes are accepted and converted, since exporters are not
    /// consistent about writing `1` versus `1.0`.
    pub fn get_f32_or(&self, key: &str, default: f32) -> Result<f32> {
        match self.values.get(key) {
            None => Ok(default),
            Some(AttributeValue::Float(v)) => Ok(*v),
            Some(AttributeValue::Int(v)) => Ok(*v as f32),
            Some(other) => Err(type_error(key, "float", other)),
        }
    }

    /// Read an integer attribute, falling back to `default` when absent.
    pub fn get_i64_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.values.get(key) {
            None => Ok(default),
            Some(AttributeValue::Int(v)) => Ok(*v),
            Some(other) => Err(type_error(key, "int", other)),
        }
    }

    /// Read an integer flag (`0` / non-zero), falling back to `default`.
    pub fn get_flag_or(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.get_i64_or(key, default as i64)? != 0)
    }
}

fn type_error(key: &str, expected: &str, got: &AttributeValue) -> GraphError {
    GraphError::AttributeType {
        key: key.to_string(),
        expected: expected.to_string(),
        got: got.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let attrs = Attributes::new();
        assert_eq!(attrs.get_f32_or("alpha", 1.0).unwrap(), 1.0);
        assert_eq!(attrs.get_i64_or("axis", -1).unwrap(), -1);
        assert!(!attrs.get_flag_or("transA", false).unwrap());
    }

    #[test]
    fn test_typed_reads() {
        let attrs = Attributes::new()
            .with("alpha", AttributeValue::Float(0.5))
            .with("beta", AttributeValue::Int(2))
            .with("transB", AttributeValue::Int(1));
        assert_eq!(attrs.get_f32_or("alpha", 1.0).unwrap(), 0.5);
        assert_eq!(attrs.get_f32_or("beta", 0.0).unwrap(), 2.0);
        assert!(attrs.get_flag_or("transB", false).unwrap());
        assert_eq!(attrs.get("transB"), Some(&AttributeValue::Int(1)));
    }

    #[test]
    fn test_type_mismatch() {
        let attrs = Attributes::new().with("transA", AttributeValue::String("yes".into()));
        let err = attrs.get_flag_or("transA", false).unwrap_err();
        match err {
            GraphError::AttributeType { key, expected, got } => {
                assert_eq!(key, "transA");
                assert_eq!(expected, "int");
                assert_eq!(got, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
