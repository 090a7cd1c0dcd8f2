use lw_ir::BufferId;
use lw_tensor::TensorType;

use crate::attr::Attributes;
use crate::error::{GraphError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(usize);

/// What currently produces a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDef {
    /// A graph input not yet bound to storage.
    Input,
    /// An output of a node that has not been lowered.
    Node(NodeId),
    /// Backed by a kernel buffer, either a bound input or a lowered result.
    Buffer(BufferId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub name: String,
    pub ty: TensorType,
    pub def: ValueDef,
}

impl Value {
    pub fn buffer(&self) -> Option<BufferId> {
        match self.def {
            ValueDef::Buffer(id) => Some(id),
            _ => None,
        }
    }
}

/// An operator node. Absent optional inputs are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub op: String,
    pub name: String,
    pub inputs: Vec<Option<ValueId>>,
    pub outputs: Vec<ValueId>,
    pub attributes: Attributes,
}

impl Node {
    /// The `i`-th input, `None` if absent or past the end.
    pub fn input(&self, i: usize) -> Option<ValueId> {
        self.inputs.get(i).copied().flatten()
    }
}

/// A tensor-computation graph. Nodes are kept in insertion order, which is
/// expected to be a valid topological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    values: Vec<Value>,
    nodes: Vec<Option<Node>>,
    inputs: Vec<ValueId>,
    outputs: Vec<ValueId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, name: impl Into<String>, ty: TensorType) -> ValueId {
        let id = self.push_value(name.into(), ty, ValueDef::Input);
        self.inputs.push(id);
        id
    }

    /// Append a node, creating one value per `(name, type)` in `outputs`.
    pub fn add_node(
        &mut self,
        op: impl Into<String>,
        name: impl Into<String>,
        inputs: Vec<Option<ValueId>>,
        outputs: Vec<(String, TensorType)>,
        attributes: Attributes,
    ) -> Result<(NodeId, Vec<ValueId>)> {
        for input in inputs.iter().flatten() {
            self.value(*input)?;
        }
        let node_id = NodeId(self.nodes.len());
        let output_ids: Vec<ValueId> = outputs
            .into_iter()
            .map(|(n, ty)| self.push_value(n, ty, ValueDef::Node(node_id)))
            .collect();
        self.nodes.push(Some(Node {
            op: op.into(),
            name: name.into(),
            inputs,
            outputs: output_ids.clone(),
            attributes,
        }));
        Ok((node_id, output_ids))
    }

    pub fn mark_output(&mut self, value: ValueId) {
        if !self.outputs.contains(&value) {
            self.outputs.push(value);
        }
    }

    pub fn inputs(&self) -> &[ValueId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ValueId] {
        &self.outputs
    }

    pub fn value(&self, id: ValueId) -> Result<&Value> {
        self.values.get(id.0).ok_or(GraphError::UnknownValue(id.0))
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(GraphError::UnknownNode(id.0))
    }

    /// Ids of nodes still present, in insertion order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Back a value with a kernel buffer.
    pub fn bind_buffer(&mut self, value: ValueId, buffer: BufferId) -> Result<()> {
        let v = self
            .values
            .get_mut(value.0)
            .ok_or(GraphError::UnknownValue(value.0))?;
        v.def = ValueDef::Buffer(buffer);
        Ok(())
    }

    /// Replace a node by buffers, one per node output, and remove the node.
    ///
    /// Consumers keep referring to the same `ValueId`s, which now resolve to
    /// the buffers.
    pub fn replace_node(&mut self, id: NodeId, replacements: &[BufferId]) -> Result<()> {
        let node = self.node(id)?;
        if node.outputs.len() != replacements.len() {
            return Err(GraphError::ReplacementCount {
                node: node.name.clone(),
                outputs: node.outputs.len(),
                replacements: replacements.len(),
            });
        }
        let outputs = node.outputs.clone();
        for (value, buffer) in outputs.into_iter().zip(replacements) {
            self.bind_buffer(value, *buffer)?;
        }
        self.nodes[id.0] = None;
        Ok(())
    }

    fn push_value(&mut self, name: String, ty: TensorType, def: ValueDef) -> ValueId {
        self.values.push(Value { name, ty, def });
        ValueId(self.values.len() - 1)
    }
}
