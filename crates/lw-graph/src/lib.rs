//! `lw-graph` - Operator graphs and the rewrite driver that lowers them.
//!
//! A `Graph` holds typed values and operator nodes in topological order.
//! `RewritePattern`s register for an operator name; the `RewriteDriver`
//! offers each node to its pattern and commits the emitted statements to a
//! single kernel, replacing the node's outputs by the buffers it produced.

pub mod attr;
pub mod driver;
pub mod error;
pub mod graph;
pub mod rewrite;

pub use attr::{AttributeValue, Attributes};
pub use driver::{DriverOptions, FailurePolicy, LoweredProgram, RewriteDriver, RewriteReport};
pub use error::{GraphError, Result};
pub use graph::{Graph, Node, NodeId, Value, ValueDef, ValueId};
pub use rewrite::{PatternError, Rewrite, RewritePattern};
