//! Reference interpreter for kernels.
//!
//! Executes statements one by one on host tensors. Every load and store is
//! bounds-checked against the buffer's resolved shape, so a kernel whose
//! symbolic sizes disagree at run time fails instead of reading garbage.

use std::collections::HashMap;

use log::debug;
use lw_tensor::{Scalar, SymbolBindings, Tensor};

use crate::error::{IrError, Result};
use crate::expr::{IndexExpr, Predicate, ScalarExpr};
use crate::kernel::{BufferId, BufferKind, Kernel, LocalId, LoopVar};
use crate::stmt::Stmt;

pub struct Interpreter<'k> {
    kernel: &'k Kernel,
    bindings: SymbolBindings,
}

/// Mutable state of one run.
struct Frame {
    buffers: Vec<Tensor>,
    loops: HashMap<LoopVar, i64>,
    locals: HashMap<LocalId, Scalar>,
}

impl<'k> Interpreter<'k> {
    pub fn new(kernel: &'k Kernel) -> Self {
        Self {
            kernel,
            bindings: SymbolBindings::new(),
        }
    }

    /// Values for the symbolic dimensions the kernel mentions.
    pub fn with_bindings(mut self, bindings: SymbolBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Run the kernel on named inputs and return its outputs by buffer name.
    pub fn run(&self, inputs: &HashMap<String, Tensor>) -> Result<HashMap<String, Tensor>> {
        debug!(
            "interpreting kernel '{}' ({} top-level statements)",
            self.kernel.name(),
            self.kernel.body().len()
        );
        let mut frame = Frame {
            buffers: Vec::new(),
            loops: HashMap::new(),
            locals: HashMap::new(),
        };
        for (_, decl) in self.kernel.buffers() {
            let shape = decl.ty.resolve(&self.bindings)?;
            let tensor = match decl.kind {
                BufferKind::Input => {
                    let given = inputs
                        .get(&decl.name)
                        .ok_or_else(|| IrError::MissingInput(decl.name.clone()))?;
                    if given.shape() != &shape {
                        return Err(IrError::InputShapeMismatch {
                            name: decl.name.clone(),
                            expected: shape,
                            got: given.shape().clone(),
                        });
                    }
                    given.cast(decl.ty.dtype())
                }
                BufferKind::Alloc => Tensor::zeros(shape, decl.ty.dtype()),
            };
            frame.buffers.push(tensor);
        }

        self.block(&mut frame, self.kernel.body())?;

        let mut outputs = HashMap::new();
        for id in self.kernel.outputs() {
            let tensor = frame
                .buffers
                .get(id.index())
                .cloned()
                .ok_or(IrError::UnknownBuffer(id.index()))?;
            outputs.insert(self.kernel.buffer_name(*id).to_string(), tensor);
        }
        Ok(outputs)
    }

    fn block(&self, frame: &mut Frame, stmts: &[Stmt]) -> Result<()> {
        // Locals declared in this block go out of scope at its end.
        let mut declared = Vec::new();
        for stmt in stmts {
            match stmt {
                Stmt::Loop {
                    var,
                    lower,
                    upper,
                    body,
                } => {
                    let lo = self.index(frame, lower)?;
                    let hi = self.index(frame, upper)?;
                    for i in lo..hi {
                        frame.loops.insert(*var, i);
                        self.block(frame, body)?;
                    }
                    frame.loops.remove(var);
                }
                Stmt::Let { local, dtype, init } => {
                    let value = self.scalar(frame, init)?;
                    if value.dtype() != *dtype {
                        return Err(lw_tensor::TensorError::DTypeMismatch {
                            expected: *dtype,
                            got: value.dtype(),
                        }
                        .into());
                    }
                    frame.locals.insert(*local, value);
                    declared.push(*local);
                }
                Stmt::Assign { local, value } => {
                    let value = self.scalar(frame, value)?;
                    match frame.locals.get_mut(local) {
                        Some(slot) => *slot = value,
                        None => {
                            return Err(IrError::UndefinedLocal(
                                self.kernel.local_name(*local).to_string(),
                            ))
                        }
                    }
                }
                Stmt::Store {
                    buffer,
                    indices,
                    value,
                } => {
                    let value = self.scalar(frame, value)?;
                    let index = self.coords(frame, *buffer, indices)?;
                    self.buffer_mut(frame, *buffer)?.set(&index, value)?;
                }
                Stmt::Check { cond, message } => {
                    if !self.predicate(frame, cond)? {
                        return Err(IrError::CheckFailed(message.clone()));
                    }
                }
            }
        }
        for local in declared {
            frame.locals.remove(&local);
        }
        Ok(())
    }

    fn index(&self, frame: &Frame, e: &IndexExpr) -> Result<i64> {
        Ok(match e {
            IndexExpr::Const(v) => *v,
            IndexExpr::Loop(var) => *frame.loops.get(var).ok_or_else(|| {
                IrError::UnboundLoopVar(self.kernel.loop_name(*var).to_string())
            })?,
            IndexExpr::Symbol(name) => {
                let v = self
                    .bindings
                    .get(name)
                    .ok_or_else(|| lw_tensor::TensorError::UnboundSymbol(name.clone()))?;
                i64::try_from(v).map_err(|_| IrError::IndexOverflow(v))?
            }
            IndexExpr::Select {
                cond,
                on_true,
                on_false,
            } => {
                if self.predicate(frame, cond)? {
                    self.index(frame, on_true)?
                } else {
                    self.index(frame, on_false)?
                }
            }
        })
    }

    fn predicate(&self, frame: &Frame, p: &Predicate) -> Result<bool> {
        match p {
            Predicate::Gt(a, b) => Ok(self.index(frame, a)? > self.index(frame, b)?),
            Predicate::Eq(a, b) => Ok(self.index(frame, a)? == self.index(frame, b)?),
            Predicate::Or(a, b) => Ok(self.predicate(frame, a)? || self.predicate(frame, b)?),
        }
    }

    fn scalar(&self, frame: &Frame, e: &ScalarExpr) -> Result<Scalar> {
        Ok(match e {
            ScalarExpr::Const { value, dtype } => Scalar::from_f64(*dtype, *value),
            ScalarExpr::Load { buffer, indices } => {
                let index = self.coords(frame, *buffer, indices)?;
                let tensor = frame
                    .buffers
                    .get(buffer.index())
                    .ok_or(IrError::UnknownBuffer(buffer.index()))?;
                tensor.get(&index)?
            }
            ScalarExpr::Local(local) => *frame.locals.get(local).ok_or_else(|| {
                IrError::UndefinedLocal(self.kernel.local_name(*local).to_string())
            })?,
            ScalarExpr::Add(a, b) => self.scalar(frame, a)?.add(self.scalar(frame, b)?)?,
            ScalarExpr::Mul(a, b) => self.scalar(frame, a)?.mul(self.scalar(frame, b)?)?,
        })
    }

    fn coords(&self, frame: &Frame, buffer: BufferId, indices: &[IndexExpr]) -> Result<Vec<usize>> {
        indices
            .iter()
            .map(|e| {
                let v = self.index(frame, e)?;
                usize::try_from(v).map_err(|_| IrError::NegativeIndex {
                    buffer: self.kernel.buffer_name(buffer).to_string(),
                    value: v,
                })
            })
            .collect()
    }

    fn buffer_mut<'f>(&self, frame: &'f mut Frame, id: BufferId) -> Result<&'f mut Tensor> {
        frame
            .buffers
            .get_mut(id.index())
            .ok_or(IrError::UnknownBuffer(id.index()))
    }
}
