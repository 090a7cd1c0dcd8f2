use lw_ir::{BufferId, KernelBuilder, Stmt};

use crate::graph::{Graph, Node};

/// Error type patterns hand back to the driver. The driver does not inspect
/// it; it only decides whether to abort or skip.
pub type PatternError = Box<dyn std::error::Error + Send + Sync>;

/// The product of a successful rewrite: statements to commit and one buffer
/// per node output.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub stmts: Vec<Stmt>,
    pub replacements: Vec<BufferId>,
}

/// A rule that lowers one kind of operator node into kernel code.
pub trait RewritePattern: Send + Sync {
    /// Returns the name of this pattern, for logs and errors.
    fn name(&self) -> &str;

    /// The operator this pattern is registered for (e.g. "Gemm").
    fn root_op(&self) -> &str;

    /// Try to lower `node`.
    ///
    /// - `Ok(Some(_))`: the node can be replaced.
    /// - `Ok(None)`: the pattern does not apply here; nothing was touched.
    /// - `Err(_)`: the pattern applies but the node is invalid. The pattern
    ///   must not have allocated anything or emitted anything.
    ///
    /// The returned statements are not yet in the kernel; the driver commits
    /// them.
    fn match_and_rewrite(
        &self,
        node: &Node,
        graph: &Graph,
        builder: &mut KernelBuilder,
    ) -> Result<Option<Rewrite>, PatternError>;
}
