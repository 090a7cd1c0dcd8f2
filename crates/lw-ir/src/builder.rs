use log::trace;
use lw_tensor::TensorType;

use crate::kernel::{BufferDecl, BufferId, BufferKind, Kernel, LocalId, LoopVar};
use crate::stmt::Stmt;

/// Contract for obtaining output storage during a lowering.
///
/// The returned buffer has the requested type and lives until the kernel
/// finishes; release is the allocator's business, not the caller's.
pub trait BufferAllocator {
    fn allocate(&mut self, name: &str, ty: TensorType) -> BufferId;
}

/// Accumulates declarations and committed statement blocks for one kernel.
///
/// Lowerings never write into the builder directly: they build a `Vec<Stmt>`
/// value and the caller commits it with `push` once the whole lowering has
/// succeeded.
#[derive(Debug, Clone)]
pub struct KernelBuilder {
    name: String,
    buffers: Vec<BufferDecl>,
    outputs: Vec<BufferId>,
    loop_names: Vec<String>,
    local_names: Vec<String>,
    body: Vec<Stmt>,
}

impl KernelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffers: Vec::new(),
            outputs: Vec::new(),
            loop_names: Vec::new(),
            local_names: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Declare a caller-supplied buffer.
    pub fn declare_input(&mut self, name: impl Into<String>, ty: TensorType) -> BufferId {
        self.declare(name.into(), ty, BufferKind::Input)
    }

    /// Fresh loop induction variable. `name` is only used for rendering.
    pub fn loop_var(&mut self, name: impl Into<String>) -> LoopVar {
        self.loop_names.push(name.into());
        LoopVar(self.loop_names.len() - 1)
    }

    /// Fresh scalar local. `name` is only used for rendering.
    pub fn local(&mut self, name: impl Into<String>) -> LocalId {
        self.local_names.push(name.into());
        LocalId(self.local_names.len() - 1)
    }

    pub fn buffer(&self, id: BufferId) -> Option<&BufferDecl> {
        self.buffers.get(id.0)
    }

    /// Mark a buffer as a kernel result; it survives the kernel's end.
    pub fn mark_output(&mut self, id: BufferId) {
        if !self.outputs.contains(&id) {
            self.outputs.push(id);
        }
    }

    /// Rename a buffer, e.g. to the graph value it ends up backing.
    pub fn rename_buffer(&mut self, id: BufferId, name: impl Into<String>) {
        if let Some(decl) = self.buffers.get_mut(id.0) {
            decl.name = name.into();
        }
    }

    /// Commit a finished block of statements to the end of the kernel body.
    pub fn push(&mut self, stmts: impl IntoIterator<Item = Stmt>) {
        let before = self.body.len();
        self.body.extend(stmts);
        trace!(
            "kernel '{}': committed {} top-level statements",
            self.name,
            self.body.len() - before
        );
    }

    pub fn finish(self) -> Kernel {
        Kernel {
            name: self.name,
            buffers: self.buffers,
            outputs: self.outputs,
            loop_names: self.loop_names,
            local_names: self.local_names,
            body: self.body,
        }
    }

    fn declare(&mut self, name: String, ty: TensorType, kind: BufferKind) -> BufferId {
        self.buffers.push(BufferDecl { name, ty, kind });
        BufferId(self.buffers.len() - 1)
    }
}

impl BufferAllocator for KernelBuilder {
    fn allocate(&mut self, name: &str, ty: TensorType) -> BufferId {
        trace!("kernel '{}': allocating {} as {}", self.name, name, ty);
        self.declare(name.to_string(), ty, BufferKind::Alloc)
    }
}
