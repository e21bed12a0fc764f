use super::node::{EdgeId, NodeId, Params, PortId};

/// A directed connection from one node's output port to another node's input port.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    source_port: PortId,
    target: NodeId,
    target_port: PortId,
    /// Editor attributes this crate does not interpret (animation, style, ...).
    pub ui_extra: Params,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        source: NodeId,
        source_port: PortId,
        target: NodeId,
        target_port: PortId,
    ) -> Self {
        Self {
            id,
            source,
            source_port,
            target,
            target_port,
            ui_extra: Params::new(),
        }
    }

    /// The id the graph editor assigns to a connection it creates itself.
    pub fn editor_id(
        source: &NodeId,
        source_port: &PortId,
        target: &NodeId,
        target_port: &PortId,
    ) -> EdgeId {
        EdgeId::from(format!(
            "reactflow__edge-{}{}-{}{}",
            source, source_port, target, target_port
        ))
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn source_port(&self) -> &PortId {
        &self.source_port
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn target_port(&self) -> &PortId {
        &self.target_port
    }

    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}
