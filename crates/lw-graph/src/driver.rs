use log::{debug, info, warn};
use lw_ir::{Kernel, KernelBuilder};

use crate::error::{GraphError, Result};
use crate::graph::{Graph, NodeId};
use crate::rewrite::RewritePattern;

/// What the driver does when a pattern reports an invalid node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure and leave the graph untouched.
    #[default]
    Abort,
    /// Keep the failing node in the graph and continue with the others.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    pub failure_policy: FailurePolicy,
    /// Name given to the produced kernel.
    pub kernel_name: String,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            kernel_name: "main".to_string(),
        }
    }
}

/// Outcome per node of one driver run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteReport {
    pub rewritten: Vec<NodeId>,
    /// Nodes a pattern rejected under `FailurePolicy::Skip`, with the reason.
    pub skipped: Vec<(NodeId, String)>,
    /// Nodes no registered pattern applied to.
    pub unmatched: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct LoweredProgram {
    pub kernel: Kernel,
    pub report: RewriteReport,
}

/// Applies registered patterns to every node of a graph, in node order.
pub struct RewriteDriver {
    patterns: Vec<Box<dyn RewritePattern>>,
    options: DriverOptions,
}

impl RewriteDriver {
    pub fn new(options: DriverOptions) -> Self {
        Self {
            patterns: Vec::new(),
            options,
        }
    }

    /// Register a pattern. Returns self for builder-style usage.
    pub fn with(mut self, pattern: Box<dyn RewritePattern>) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Lower every node some pattern applies to.
    ///
    /// Graph inputs become kernel inputs; lowered graph outputs become kernel
    /// outputs named after the graph values. The graph is only updated when
    /// the run succeeds; on an aborting failure it is left exactly as it was.
    pub fn run(&self, graph: &mut Graph) -> Result<LoweredProgram> {
        info!(
            "rewriting {} nodes with {} patterns",
            graph.num_nodes(),
            self.patterns.len()
        );
        let mut working = graph.clone();
        let mut builder = KernelBuilder::new(self.options.kernel_name.clone());
        let mut report = RewriteReport::default();

        for &input in graph.inputs() {
            let value = graph.value(input)?;
            let buffer = builder.declare_input(value.name.clone(), value.ty.clone());
            working.bind_buffer(input, buffer)?;
        }

        for node_id in graph.node_ids() {
            let node = working.node(node_id)?.clone();
            let Some(pattern) = self.patterns.iter().find(|p| p.root_op() == node.op) else {
                debug!("no pattern for node '{}' ({})", node.name, node.op);
                report.unmatched.push(node_id);
                continue;
            };

            match pattern.match_and_rewrite(&node, &working, &mut builder) {
                Ok(Some(rewrite)) => {
                    debug!(
                        "pattern '{}' rewrote node '{}' into {} statements",
                        pattern.name(),
                        node.name,
                        rewrite.stmts.len()
                    );
                    working.replace_node(node_id, &rewrite.replacements)?;
                    builder.push(rewrite.stmts);
                    report.rewritten.push(node_id);
                }
                Ok(None) => {
                    debug!("pattern '{}' declined node '{}'", pattern.name(), node.name);
                    report.unmatched.push(node_id);
                }
                Err(source) => match self.options.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(GraphError::PatternFailed {
                            pattern: pattern.name().to_string(),
                            node: node.name.clone(),
                            source,
                        });
                    }
                    FailurePolicy::Skip => {
                        warn!(
                            "pattern '{}' failed on node '{}', leaving it in place: {}",
                            pattern.name(),
                            node.name,
                            source
                        );
                        report.skipped.push((node_id, source.to_string()));
                    }
                },
            }
        }

        for &output in working.outputs() {
            let value = working.value(output)?;
            if let Some(buffer) = value.buffer() {
                builder.rename_buffer(buffer, value.name.clone());
                builder.mark_output(buffer);
            }
        }

        info!(
            "rewrote {} nodes ({} skipped, {} unmatched)",
            report.rewritten.len(),
            report.skipped.len(),
            report.unmatched.len()
        );
        *graph = working;
        Ok(LoweredProgram {
            kernel: builder.finish(),
            report,
        })
    }
}
