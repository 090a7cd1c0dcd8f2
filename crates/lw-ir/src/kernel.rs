use lw_tensor::TensorType;

use crate::stmt::Stmt;

/// Handle to a buffer declared in a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub(crate) usize);

/// Handle to a loop induction variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopVar(pub(crate) usize);

/// Handle to a scalar local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub(crate) usize);

impl BufferId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Where a buffer's storage comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    /// Supplied by the caller when the kernel runs.
    Input,
    /// Allocated by the kernel; released when the kernel finishes unless it
    /// is one of the kernel outputs.
    Alloc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferDecl {
    pub name: String,
    pub ty: TensorType,
    pub kind: BufferKind,
}

/// A finished kernel: declarations plus a statement tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    pub(crate) name: String,
    pub(crate) buffers: Vec<BufferDecl>,
    pub(crate) outputs: Vec<BufferId>,
    pub(crate) loop_names: Vec<String>,
    pub(crate) local_names: Vec<String>,
    pub(crate) body: Vec<Stmt>,
}

impl Kernel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffer(&self, id: BufferId) -> Option<&BufferDecl> {
        self.buffers.get(id.0)
    }

    /// All buffer declarations with their handles, in declaration order.
    pub fn buffers(&self) -> impl Iterator<Item = (BufferId, &BufferDecl)> {
        self.buffers.iter().enumerate().map(|(i, b)| (BufferId(i), b))
    }

    pub fn outputs(&self) -> &[BufferId] {
        &self.outputs
    }

    pub fn body(&self) -> &[Stmt] {
        &self.body
    }

    pub fn loop_name(&self, var: LoopVar) -> &str {
        self.loop_names.get(var.0).map(String::as_str).unwrap_or("?")
    }

    pub fn local_name(&self, local: LocalId) -> &str {
        self.local_names.get(local.0).map(String::as_str).unwrap_or("?")
    }

    pub fn buffer_name(&self, id: BufferId) -> &str {
        self.buffer(id).map(|b| b.name.as_str()).unwrap_or("?")
    }
}
