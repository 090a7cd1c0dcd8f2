use thiserror::Error;

use crate::rewrite::PatternError;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("unknown node #{0}")]
    UnknownNode(usize),
    #[error("unknown value #{0}")]
    UnknownValue(usize),
    #[error("type mismatch for attribute '{key}': expected {expected}, got {got}")]
    AttributeType {
        key: String,
        expected: String,
        got: String,
    },
    #[error("node '{node}' has {outputs} outputs but the rewrite produced {replacements} replacements")]
    ReplacementCount {
        node: String,
        outputs: usize,
        replacements: usize,
    },
    #[error("pattern '{pattern}' failed on node '{node}': {source}")]
    PatternFailed {
        pattern: String,
        node: String,
        #[source]
        source: PatternError,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
