use log::debug;
use lw_graph::{Graph, Node, PatternError, Rewrite, RewritePattern, ValueId};
use lw_ir::KernelBuilder;

use crate::attributes::GemmAttributes;
use crate::config::LoweringOptions;
use crate::lower::{lower_gemm, GemmOperand, GemmOperands};

/// Rewrites `Gemm` nodes into loop nests.
///
/// Inputs are positional: `A`, `B` and an optional `C`. The node declines
/// (no match) when `A` or `B` is absent or an input is not yet backed by a
/// buffer. The declared type of the output value must agree with the product.
#[derive(Debug, Clone, Default)]
pub struct GemmLowering {
    options: LoweringOptions,
}

impl GemmLowering {
    pub fn new(options: LoweringOptions) -> Self {
        Self { options }
    }
}

/// Type and buffer of an input value, if it has been lowered already.
fn operand(graph: &Graph, value: ValueId) -> Result<Option<GemmOperand>, PatternError> {
    let value = graph.value(value)?;
    Ok(value.buffer().map(|buffer| GemmOperand {
        ty: value.ty.clone(),
        buffer,
    }))
}

impl RewritePattern for GemmLowering {
    fn name(&self) -> &str {
        "gemm-to-loops"
    }

    fn root_op(&self) -> &str {
        "Gemm"
    }

    fn match_and_rewrite(
        &self,
        node: &Node,
        graph: &Graph,
        builder: &mut KernelBuilder,
    ) -> Result<Option<Rewrite>, PatternError> {
        let (Some(a), Some(b), Some(&y)) = (node.input(0), node.input(1), node.outputs.first())
        else {
            debug!("gemm node '{}' is missing A, B or its output", node.name);
            return Ok(None);
        };
        let (Some(a), Some(b)) = (operand(graph, a)?, operand(graph, b)?) else {
            debug!("gemm node '{}' has operands that are not lowered yet", node.name);
            return Ok(None);
        };
        let c = match node.input(2) {
            Some(c) => match operand(graph, c)? {
                Some(c) => Some(c),
                None => {
                    debug!("gemm node '{}' has a bias that is not lowered yet", node.name);
                    return Ok(None);
                }
            },
            None => None,
        };

        let attrs = GemmAttributes::from_attributes(&node.attributes)?;
        let output = graph.value(y)?;
        let lowered = lower_gemm(
            &GemmOperands { a, b, c },
            &attrs,
            &output.name,
            Some(&output.ty),
            &self.options,
            builder,
        )?;

        Ok(Some(Rewrite {
            stmts: lowered.stmts,
            replacements: vec![lowered.output],
        }))
    }
}
