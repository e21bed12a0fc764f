use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod params;
mod registry;

pub use params::{ParamsIssue, TaskParams};
pub use registry::{TaskDefaults, TaskRegistry, TaskSpec, registry};

/// The closed set of task kinds a workflow graph may contain.
///
/// Serialized uppercase (`"FUNCTION"`) in compiled definitions. UI snapshots use the
/// lowercase form, see [`TaskType::ui_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskType {
    Start,
    End,
    Function,
    Guard,
    Wait,
    Listen,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::Start,
        TaskType::End,
        TaskType::Function,
        TaskType::Guard,
        TaskType::Wait,
        TaskType::Listen,
    ];

    /// The uppercase wire name used by the execution engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Start => "START",
            TaskType::End => "END",
            TaskType::Function => "FUNCTION",
            TaskType::Guard => "GUARD",
            TaskType::Wait => "WAIT",
            TaskType::Listen => "LISTEN",
        }
    }

    /// The lowercase name the editor stores in its node snapshots.
    pub fn ui_name(&self) -> &'static str {
        match self {
            TaskType::Start => "start",
            TaskType::End => "end",
            TaskType::Function => "function",
            TaskType::Guard => "guard",
            TaskType::Wait => "wait",
            TaskType::Listen => "listen",
        }
    }

    /// Whether nodes of this type carry an `exec`/`execTs` script pair.
    pub fn is_scriptable(&self) -> bool {
        matches!(self, TaskType::Function | TaskType::Guard)
    }

    pub fn ports(&self) -> PortLayout {
        registry().spec(*self).ports
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse, accepting both the wire and the UI spelling.
impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

/// Port cardinality of a task type. Each side holds zero or one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortLayout {
    pub has_input: bool,
    pub has_output: bool,
}
