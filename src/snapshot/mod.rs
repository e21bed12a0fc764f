//! Editor snapshots: the node and edge arrays a draft is reopened from.

use crate::error::SnapshotError;
use crate::graph::{Edge, EdgeId, Graph, Node, NodeId, PortId};
use crate::task::TaskType;

mod types;

pub use types::{UiEdge, UiNode, UiNodeData, UiSnapshot};

const TRACING_TARGET: &str = "flowdraft::snapshot";

/// A trait for data models that can be converted into a workflow [`Graph`].
///
/// [`UiSnapshot`] implements it for the editor's own format. Implement it for other
/// stored layouts to feed them to the validator and compiler.
///
/// # Example
///
/// ```rust,no_run
/// use flowdraft::prelude::*;
/// use std::result::Result;
///
/// struct Pipeline {
///     steps: Vec<String>,
/// }
///
/// impl IntoGraph for Pipeline {
///     fn into_graph(self) -> Result<Graph, SnapshotError> {
///         let mut graph = Graph::new();
///         let mut previous: Option<PortId> = None;
///         for step in self.steps {
///             let node = graph.add_node(TaskType::Function);
///             let (id, input, output) = (
///                 node.id().clone(),
///                 node.input_port().cloned(),
///                 node.output_port().cloned(),
///             );
///             graph.update_node(&id, NodePatch::new().label(step))?;
///             if let (Some(from), Some(to)) = (previous.take(), input) {
///                 graph.connect(&from, &to)?;
///             }
///             previous = output;
///         }
///         Ok(graph)
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a graph.
    fn into_graph(self) -> Result<Graph, SnapshotError>;
}

impl UiSnapshot {
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(text).map_err(|e| SnapshotError::JsonParseError(e.to_string()))
    }

    /// Captures `graph` in the editor's layout, including attributes only the editor reads.
    pub fn from_graph(graph: &Graph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| UiNode {
                id: node.id().to_string(),
                node_type: node.task_type().ui_name().to_string(),
                position: node.position,
                data: UiNodeData {
                    label: node.label.clone(),
                    input_bound_id: node.input_port().map(PortId::to_string),
                    output_bound_id: node.output_port().map(PortId::to_string),
                    params: node.params.clone(),
                    exec: node.exec.clone(),
                    exec_ts: node.exec_ts.clone(),
                    extra: node.data_extra.clone(),
                },
                extra: node.ui_extra.clone(),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|edge| UiEdge {
                id: Some(edge.id().to_string()),
                source: edge.source().to_string(),
                source_handle: edge.source_port().to_string(),
                target: edge.target().to_string(),
                target_handle: edge.target_port().to_string(),
                extra: edge.ui_extra.clone(),
            })
            .collect();

        Self { nodes, edges }
    }
}

impl IntoGraph for UiSnapshot {
    fn into_graph(self) -> Result<Graph, SnapshotError> {
        let mut graph = Graph::new();

        for ui_node in self.nodes {
            let task_type: TaskType =
                ui_node
                    .node_type
                    .parse()
                    .map_err(|type_name| SnapshotError::UnknownTaskType {
                        node_id: ui_node.id.clone(),
                        type_name,
                    })?;

            let ports = task_type.ports();
            let data = ui_node.data;
            if ports.has_input && data.input_bound_id.is_none() {
                return Err(SnapshotError::MissingPort {
                    node_id: ui_node.id,
                    task_type: task_type.as_str(),
                    side: "input",
                });
            }
            if ports.has_output && data.output_bound_id.is_none() {
                return Err(SnapshotError::MissingPort {
                    node_id: ui_node.id,
                    task_type: task_type.as_str(),
                    side: "output",
                });
            }

            let mut node = Node::restore(
                NodeId::from(ui_node.id),
                task_type,
                data.input_bound_id.map(PortId::from),
                data.output_bound_id.map(PortId::from),
            );
            node.label = data.label;
            node.params = data.params;
            node.exec = data.exec;
            node.exec_ts = data.exec_ts;
            node.position = ui_node.position;
            node.ui_extra = ui_node.extra;
            node.data_extra = data.extra;
            graph.insert_node(node)?;
        }

        for ui_edge in self.edges {
            let source = NodeId::from(ui_edge.source);
            let source_port = PortId::from(ui_edge.source_handle);
            let target = NodeId::from(ui_edge.target);
            let target_port = PortId::from(ui_edge.target_handle);
            let id = match ui_edge.id {
                Some(id) => EdgeId::from(id),
                None => Edge::editor_id(&source, &source_port, &target, &target_port),
            };
            let mut edge = Edge::new(id, source, source_port, target, target_port);
            edge.ui_extra = ui_edge.extra;
            graph.insert_edge(edge)?;
        }

        tracing::debug!(
            target: TRACING_TARGET,
            nodes = graph.len(),
            edges = graph.edges().len(),
            "Restored graph from snapshot"
        );
        Ok(graph)
    }
}
