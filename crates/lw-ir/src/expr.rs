use lw_tensor::{DType, Dim};

use crate::error::IrError;
use crate::kernel::{BufferId, LocalId, LoopVar};

/// Integer-valued address arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexExpr {
    Const(i64),
    /// Current value of a loop induction variable.
    Loop(LoopVar),
    /// A symbolic dimension size, bound when the kernel runs.
    Symbol(String),
    /// `cond ? on_true : on_false`, evaluated at run time.
    Select {
        cond: Box<Predicate>,
        on_true: Box<IndexExpr>,
        on_false: Box<IndexExpr>,
    },
}

/// Boolean conditions over index expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Gt(IndexExpr, IndexExpr),
    Eq(IndexExpr, IndexExpr),
    Or(Box<Predicate>, Box<Predicate>),
}

impl IndexExpr {
    pub fn zero() -> Self {
        IndexExpr::Const(0)
    }

    pub fn as_const(&self) -> Option<i64> {
        match self {
            IndexExpr::Const(v) => Some(*v),
            _ => None,
        }
    }

    /// Build a select, folding it away when the condition is constant.
    pub fn select(cond: Predicate, on_true: IndexExpr, on_false: IndexExpr) -> Self {
        match cond.as_const() {
            Some(true) => on_true,
            Some(false) => on_false,
            None => IndexExpr::Select {
                cond: Box::new(cond),
                on_true: Box::new(on_true),
                on_false: Box::new(on_false),
            },
        }
    }
}

impl Predicate {
    /// The truth value, when both sides are constants.
    pub fn as_const(&self) -> Option<bool> {
        match self {
            Predicate::Gt(a, b) => Some(a.as_const()? > b.as_const()?),
            Predicate::Eq(a, b) => Some(a.as_const()? == b.as_const()?),
            Predicate::Or(a, b) => match (a.as_const(), b.as_const()) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
        }
    }

    pub fn or(self, rhs: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }
}

impl From<LoopVar> for IndexExpr {
    fn from(var: LoopVar) -> Self {
        IndexExpr::Loop(var)
    }
}

/// A dimension as an index extent. Fails for constants beyond `i64::MAX`.
impl TryFrom<&Dim> for IndexExpr {
    type Error = IrError;

    fn try_from(dim: &Dim) -> Result<Self, IrError> {
        match dim {
            Dim::Const(v) => i64::try_from(*v)
                .map(IndexExpr::Const)
                .map_err(|_| IrError::IndexOverflow(*v)),
            Dim::Symbol(name) => Ok(IndexExpr::Symbol(name.clone())),
        }
    }
}

/// Element-valued arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarExpr {
    /// A literal materialized in `dtype`.
    Const { value: f64, dtype: DType },
    Load {
        buffer: BufferId,
        indices: Vec<IndexExpr>,
    },
    Local(LocalId),
    Add(Box<ScalarExpr>, Box<ScalarExpr>),
    Mul(Box<ScalarExpr>, Box<ScalarExpr>),
}

impl ScalarExpr {
    pub fn constant(value: f64, dtype: DType) -> Self {
        ScalarExpr::Const { value, dtype }
    }

    pub fn load(buffer: BufferId, indices: Vec<IndexExpr>) -> Self {
        ScalarExpr::Load { buffer, indices }
    }

    pub fn add(self, rhs: ScalarExpr) -> Self {
        ScalarExpr::Add(Box::new(self), Box::new(rhs))
    }

    pub fn mul(self, rhs: ScalarExpr) -> Self {
        ScalarExpr::Mul(Box::new(self), Box::new(rhs))
    }
}

impl From<LocalId> for ScalarExpr {
    fn from(local: LocalId) -> Self {
        ScalarExpr::Local(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_folds_constant_condition() {
        let idx = IndexExpr::Loop(LoopVar(0));
        let folded = IndexExpr::select(
            Predicate::Gt(IndexExpr::Const(4), IndexExpr::Const(1)),
            idx.clone(),
            IndexExpr::zero(),
        );
        assert_eq!(folded, idx);

        let folded = IndexExpr::select(
            Predicate::Gt(IndexExpr::Const(1), IndexExpr::Const(1)),
            idx,
            IndexExpr::zero(),
        );
        assert_eq!(folded, IndexExpr::Const(0));
    }

    #[test]
    fn test_select_kept_for_symbols() {
        let e = IndexExpr::select(
            Predicate::Gt(IndexExpr::Symbol("N".into()), IndexExpr::Const(1)),
            IndexExpr::Loop(LoopVar(0)),
            IndexExpr::zero(),
        );
        assert!(matches!(e, IndexExpr::Select { .. }));
    }

    #[test]
    fn test_predicate_folding() {
        let n = IndexExpr::Symbol("N".into());
        let eq_one = Predicate::Eq(n.clone(), IndexExpr::Const(1));
        assert_eq!(eq_one.as_const(), None);
        let always = Predicate::Eq(IndexExpr::Const(2), IndexExpr::Const(2));
        assert_eq!(eq_one.clone().or(always).as_const(), Some(true));
        let never = Predicate::Gt(IndexExpr::Const(0), IndexExpr::Const(1));
        assert_eq!(eq_one.or(never.clone()).as_const(), None);
        assert_eq!(never.clone().or(never).as_const(), Some(false));
    }

    #[test]
    fn test_from_dim() {
        assert_eq!(IndexExpr::try_from(&Dim::Const(3)), Ok(IndexExpr::Const(3)));
        assert_eq!(
            IndexExpr::try_from(&Dim::symbol("K")),
            Ok(IndexExpr::Symbol("K".to_string()))
        );
        assert_eq!(
            IndexExpr::try_from(&Dim::Const(usize::MAX)),
            Err(IrError::IndexOverflow(usize::MAX))
        );
    }
}
