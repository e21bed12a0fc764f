use crate::graph::{Params, Position};
use serde::{Deserialize, Serialize};

/// The `data` object of an editor node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiNodeData {
    #[serde(default)]
    pub label: String,
    #[serde(rename = "inputBoundId", default, skip_serializing_if = "Option::is_none")]
    pub input_bound_id: Option<String>,
    #[serde(rename = "outputBoundId", default, skip_serializing_if = "Option::is_none")]
    pub output_bound_id: Option<String>,
    #[serde(default)]
    pub params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<String>,
    #[serde(rename = "execTs", default, skip_serializing_if = "Option::is_none")]
    pub exec_ts: Option<String>,
    #[serde(flatten)]
    pub extra: Params,
}

/// Editor node with id, lowercase task type and position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    pub data: UiNodeData,
    #[serde(flatten)]
    pub extra: Params,
}

/// Editor edge connecting two bound ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    #[serde(rename = "sourceHandle")]
    pub source_handle: String,
    pub target: String,
    #[serde(rename = "targetHandle")]
    pub target_handle: String,
    #[serde(flatten)]
    pub extra: Params,
}

/// The raw node and edge arrays the editor saves next to a definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiSnapshot {
    #[serde(default)]
    pub nodes: Vec<UiNode>,
    #[serde(default)]
    pub edges: Vec<UiEdge>,
}
