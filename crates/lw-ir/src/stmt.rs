use lw_tensor::DType;

use crate::expr::{IndexExpr, Predicate, ScalarExpr};
use crate::kernel::{BufferId, LocalId, LoopVar};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `for var in lower..upper { body }`, unit step.
    Loop {
        var: LoopVar,
        lower: IndexExpr,
        upper: IndexExpr,
        body: Vec<Stmt>,
    },
    /// Declare a scalar local scoped to the enclosing block.
    Let {
        local: LocalId,
        dtype: DType,
        init: ScalarExpr,
    },
    Assign {
        local: LocalId,
        value: ScalarExpr,
    },
    Store {
        buffer: BufferId,
        indices: Vec<IndexExpr>,
        value: ScalarExpr,
    },
    /// Abort the kernel with `message` unless `cond` holds.
    Check { cond: Predicate, message: String },
}

impl Stmt {
    /// A loop over `[0, upper)`.
    pub fn range(var: LoopVar, upper: IndexExpr, body: Vec<Stmt>) -> Self {
        Stmt::Loop {
            var,
            lower: IndexExpr::zero(),
            upper,
            body,
        }
    }

    /// Number of statements in this subtree, including itself.
    pub fn count(&self) -> usize {
        match self {
            Stmt::Loop { body, .. } => 1 + body.iter().map(Stmt::count).sum::<usize>(),
            _ => 1,
        }
    }

    /// Loop nesting depth of this subtree.
    pub fn depth(&self) -> usize {
        match self {
            Stmt::Loop { body, .. } => 1 + body.iter().map(Stmt::depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}
