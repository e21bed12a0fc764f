use crate::task::{TaskType, registry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// A node's free-form parameter map. Insertion order is preserved.
pub type Params = serde_json::Map<String, Value>;

/// Defines an opaque, string-backed identifier type.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// A fresh random (v4 UUID) identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

define_id!(
    /// Identifies a node for its whole lifetime.
    NodeId
);
define_id!(
    /// A bound id: the endpoint an edge attaches to. Only used to route edges.
    PortId
);
define_id!(
    /// Identifies an edge.
    EdgeId
);

/// Canvas position, carried only so the editor can reopen a draft as it was left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 100.0, y: 100.0 }
    }
}

/// A task instance in the graph.
///
/// Identity (`id`, `task_type`, ports) is fixed at construction. The data fields are
/// public for reading; inside a [`Graph`](super::Graph) they change only through
/// [`Graph::update_node`](super::Graph::update_node).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    task_type: TaskType,
    input_port: Option<PortId>,
    output_port: Option<PortId>,
    pub label: String,
    pub params: Params,
    pub exec: Option<String>,
    pub exec_ts: Option<String>,
    pub position: Position,
    /// Editor attributes this crate does not interpret (size, selection, ...).
    pub ui_extra: Params,
    /// Unknown keys of the editor's `data` object, kept for the round trip.
    pub data_extra: Params,
}

impl Node {
    /// Creates a node with fresh ids and the registry defaults for `task_type`.
    pub fn create(task_type: TaskType) -> Self {
        let spec = registry().spec(task_type);
        let defaults = spec.defaults();
        Self {
            id: NodeId::generate(),
            task_type,
            input_port: spec.ports.has_input.then(PortId::generate),
            output_port: spec.ports.has_output.then(PortId::generate),
            label: spec.default_label(),
            params: defaults.params,
            exec: defaults.exec,
            exec_ts: defaults.exec_ts,
            position: Position::default(),
            ui_extra: Params::new(),
            data_extra: Params::new(),
        }
    }

    /// Rebuilds a node from persisted identity. Ports on a side the task type does
    /// not have are discarded. All data fields start empty.
    pub fn restore(
        id: NodeId,
        task_type: TaskType,
        input_port: Option<PortId>,
        output_port: Option<PortId>,
    ) -> Self {
        let ports = task_type.ports();
        Self {
            id,
            task_type,
            input_port: input_port.filter(|_| ports.has_input),
            output_port: output_port.filter(|_| ports.has_output),
            label: String::new(),
            params: Params::new(),
            exec: None,
            exec_ts: None,
            position: Position::default(),
            ui_extra: Params::new(),
            data_extra: Params::new(),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn input_port(&self) -> Option<&PortId> {
        self.input_port.as_ref()
    }

    pub fn output_port(&self) -> Option<&PortId> {
        self.output_port.as_ref()
    }

    pub(crate) fn apply(&mut self, patch: NodePatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        for key in &patch.remove_params {
            self.params.remove(key);
        }
        for (key, value) in patch.params {
            self.params.insert(key, value);
        }
        if let Some(exec) = patch.exec {
            self.exec = Some(exec);
        }
        if let Some(exec_ts) = patch.exec_ts {
            self.exec_ts = Some(exec_ts);
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
    }
}

/// A partial update merged into a node's data. Anything not mentioned is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub label: Option<String>,
    /// Keys inserted into (or overwritten in) the existing params.
    pub params: Params,
    /// Keys removed from the existing params, applied before `params`.
    pub remove_params: Vec<String>,
    pub exec: Option<String>,
    pub exec_ts: Option<String>,
    pub position: Option<Position>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn remove_param(mut self, key: impl Into<String>) -> Self {
        self.remove_params.push(key.into());
        self
    }

    pub fn exec(mut self, exec: impl Into<String>) -> Self {
        self.exec = Some(exec.into());
        self
    }

    pub fn exec_ts(mut self, exec_ts: impl Into<String>) -> Self {
        self.exec_ts = Some(exec_ts.into());
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Field names this patch changes, in the validator's field vocabulary.
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.label.is_some() {
            fields.push("label");
        }
        if !self.params.is_empty() || !self.remove_params.is_empty() {
            fields.push("params");
        }
        if self.exec.is_some() {
            fields.push("exec");
        }
        if self.exec_ts.is_some() {
            fields.push("execTs");
        }
        fields
    }
}
