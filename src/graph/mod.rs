//! The in-memory workflow graph and its structural operations.
//!
//! Operations here keep the graph referentially intact: no edge points at a missing
//! node or port, and an input port is bound at most once. Semantic rules such as label
//! uniqueness are checked by the [`validator`](crate::validator), so half-edited
//! states stay representable.

use crate::error::GraphError;
use crate::task::TaskType;
use ahash::AHashMap;

mod edge;
mod node;

pub use edge::Edge;
pub use node::{EdgeId, Node, NodeId, NodePatch, Params, PortId, Position};

const TRACING_TARGET: &str = "flowdraft::graph";

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortSide {
    Input,
    Output,
}

impl PortSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortSide::Input => "input",
            PortSide::Output => "output",
        }
    }
}

/// The node a port belongs to, and on which side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    pub node: NodeId,
    pub side: PortSide,
}

/// Nodes and edges of one workflow draft. Nodes keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    ports: AHashMap<PortId, PortBinding>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node of `task_type` with fresh ids and registry defaults.
    pub fn add_node(&mut self, task_type: TaskType) -> &Node {
        let node = Node::create(task_type);
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node.id(),
            task_type = %task_type,
            "Adding node"
        );
        self.bind_ports(&node);
        self.nodes.push(node);
        &self.nodes[self.nodes.len() - 1]
    }

    /// Inserts an already constructed node, e.g. one restored from a snapshot.
    pub fn insert_node(&mut self, node: Node) -> Result<&Node, GraphError> {
        if self.node(node.id()).is_some() {
            return Err(GraphError::DuplicateNode(node.id().clone()));
        }
        for port in node.input_port().into_iter().chain(node.output_port()) {
            if self.ports.contains_key(port) {
                return Err(GraphError::DuplicatePort(port.clone()));
            }
        }
        if let (Some(input), Some(output)) = (node.input_port(), node.output_port()) {
            if input == output {
                return Err(GraphError::DuplicatePort(input.clone()));
            }
        }
        self.bind_ports(&node);
        self.nodes.push(node);
        Ok(&self.nodes[self.nodes.len() - 1])
    }

    /// Removes a node together with every edge attached to it.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<Node, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id() == node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        let node = self.nodes.remove(index);
        for port in node.input_port().into_iter().chain(node.output_port()) {
            self.ports.remove(port);
        }

        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(node_id));
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node_id,
            removed_edges = before - self.edges.len(),
            "Removed node"
        );
        Ok(node)
    }

    /// Connects an output port to an input port.
    ///
    /// An output port may fan out to any number of edges, an input port accepts one.
    pub fn connect(&mut self, source_port: &PortId, target_port: &PortId) -> Result<&Edge, GraphError> {
        let (source, target) = self.check_connection(source_port, target_port)?;
        let id = Edge::editor_id(&source, source_port, &target, target_port);
        let edge = Edge::new(id, source, source_port.clone(), target, target_port.clone());
        tracing::debug!(
            target: TRACING_TARGET,
            edge_id = %edge.id(),
            "Connected ports"
        );
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Inserts an already constructed edge, e.g. one restored from a snapshot.
    ///
    /// The edge's node ids must match the owners of its ports.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<&Edge, GraphError> {
        if self.edge(edge.id()).is_some() {
            return Err(GraphError::DuplicateEdge(edge.id().clone()));
        }
        let (source, target) = self.check_connection(edge.source_port(), edge.target_port())?;
        if &source != edge.source() {
            return Err(GraphError::UnknownPort(edge.source_port().clone()));
        }
        if &target != edge.target() {
            return Err(GraphError::UnknownPort(edge.target_port().clone()));
        }
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    pub fn disconnect(&mut self, edge_id: &EdgeId) -> Result<Edge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id() == edge_id)
            .ok_or_else(|| GraphError::UnknownEdge(edge_id.clone()))?;
        tracing::debug!(target: TRACING_TARGET, edge_id = %edge_id, "Disconnected edge");
        Ok(self.edges.remove(index))
    }

    /// Merges `patch` into the node's data, keeping every field it does not mention.
    pub fn update_node(&mut self, node_id: &NodeId, patch: NodePatch) -> Result<&Node, GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id() == node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %node_id,
            fields = ?patch.touched_fields(),
            "Updating node data"
        );
        node.apply(patch);
        Ok(node)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == node_id)
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id() == edge_id)
    }

    pub fn port(&self, port_id: &PortId) -> Option<&PortBinding> {
        self.ports.get(port_id)
    }

    /// The edge bound to an input port, if any.
    pub fn edge_into(&self, target_port: &PortId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.target_port() == target_port)
    }

    pub fn edges_from<'a>(&'a self, source_port: &'a PortId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source_port() == source_port)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn bind_ports(&mut self, node: &Node) {
        if let Some(port) = node.input_port() {
            self.ports.insert(
                port.clone(),
                PortBinding {
                    node: node.id().clone(),
                    side: PortSide::Input,
                },
            );
        }
        if let Some(port) = node.output_port() {
            self.ports.insert(
                port.clone(),
                PortBinding {
                    node: node.id().clone(),
                    side: PortSide::Output,
                },
            );
        }
    }

    /// Resolves both ports to their nodes and checks sides and the single-upstream rule.
    fn check_connection(
        &self,
        source_port: &PortId,
        target_port: &PortId,
    ) -> Result<(NodeId, NodeId), GraphError> {
        let source = self.bound_on(source_port, PortSide::Output)?;
        let target = self.bound_on(target_port, PortSide::Input)?;
        if let Some(existing) = self.edge_into(target_port) {
            tracing::warn!(
                target: TRACING_TARGET,
                port = %target_port,
                existing = %existing.id(),
                "Refusing second edge into an input port"
            );
            return Err(GraphError::PortAlreadyBound {
                port: target_port.clone(),
                existing: existing.id().clone(),
            });
        }
        Ok((source, target))
    }

    fn bound_on(&self, port: &PortId, expected: PortSide) -> Result<NodeId, GraphError> {
        let binding = self
            .ports
            .get(port)
            .ok_or_else(|| GraphError::UnknownPort(port.clone()))?;
        if binding.side != expected {
            return Err(GraphError::WrongPortSide {
                port: port.clone(),
                expected: expected.as_str(),
                actual: binding.side.as_str(),
            });
        }
        Ok(binding.node.clone())
    }
}
