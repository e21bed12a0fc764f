use crate::graph::{NodeId, Params};
use crate::task::TaskType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the execution engine accepts new runs of a definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStatus::Active => f.write_str("active"),
            WorkflowStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// Workflow-level fields supplied alongside the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub global: Params,
}

impl WorkflowMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Problems that make this metadata unfit for compilation. Empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("Name is required".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push("Description is required".to_string());
        }
        if self.global.keys().any(|k| k.trim().is_empty()) {
            problems.push("Global keys must not be empty".to_string());
        }
        problems
    }
}

/// A task in its portable, name-addressed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledTask {
    pub id: NodeId,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub next: Vec<String>,
    #[serde(default)]
    pub previous: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_ts: Option<String>,
}

/// The compiled artifact handed to the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    pub description: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub global: Params,
    pub tasks: Vec<CompiledTask>,
}

impl WorkflowDefinition {
    pub fn task(&self, name: &str) -> Option<&CompiledTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Names in `next`/`previous` that do not match any task of this definition.
    pub fn dangling_references(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .flat_map(|t| t.next.iter().chain(&t.previous))
            .map(String::as_str)
            .filter(|name| self.task(name).is_none())
            .collect()
    }
}
