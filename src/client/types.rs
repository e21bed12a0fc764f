use crate::compiler::{CompiledTask, WorkflowDefinition, WorkflowMetadata, WorkflowStatus};
use crate::graph::Params;
use crate::snapshot::UiSnapshot;
use crate::task::TaskType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The key under which the editor stores its snapshot.
pub const EDITOR_KEY: &str = "react";

/// Response wrapper used by every endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub data: T,
}

/// Body of a create or update request: the compiled definition plus the editor snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionDraft {
    #[serde(rename = "workflowData")]
    pub workflow: WorkflowDefinition,
    pub key: String,
    pub ui: UiSnapshot,
}

impl DefinitionDraft {
    pub fn new(workflow: WorkflowDefinition, ui: UiSnapshot) -> Self {
        Self {
            workflow,
            key: EDITOR_KEY.to_string(),
            ui,
        }
    }
}

/// Snapshots stored per editor key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub react: Option<UiSnapshot>,
}

/// A run as listed under its definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub workflow_status: RunStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A definition as returned by the storage service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDefinition {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub global: Params,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub tasks: Vec<CompiledTask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub ui_object: UiObject,
    #[serde(default)]
    pub runtimes: Vec<RunSummary>,
}

impl StoredDefinition {
    /// The editor snapshot to reopen this definition from, if one was saved.
    pub fn snapshot(&self) -> Option<&UiSnapshot> {
        self.ui_object.react.as_ref()
    }

    pub fn metadata(&self) -> WorkflowMetadata {
        WorkflowMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            global: self.global.clone(),
        }
    }
}

/// One entry of the definition list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// State of a run or of one task inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// The definition a run was started from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDefinitionRef {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub status: WorkflowStatus,
}

/// A log line attributed to a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    pub datetime: DateTime<Utc>,
    pub task_name: String,
    pub log: String,
}

/// A task of a run, with its execution status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunTask {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub next: Vec<String>,
    #[serde(default)]
    pub previous: Vec<String>,
    #[serde(default)]
    pub params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<String>,
    pub status: RunStatus,
}

/// Status, per-task state and logs of a started run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub workflow_status: RunStatus,
    pub definition: RunDefinitionRef,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(rename = "splittedLogs", default)]
    pub log_lines: Vec<LogLine>,
    #[serde(default)]
    pub tasks: Vec<RunTask>,
}

impl RunDetail {
    pub fn task(&self, name: &str) -> Option<&RunTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Log lines of one task, in server order.
    pub fn logs_for<'a>(&'a self, task_name: &'a str) -> impl Iterator<Item = &'a LogLine> + 'a {
        self.log_lines.iter().filter(move |l| l.task_name == task_name)
    }
}

/// Body of a run-start request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRun<'a> {
    pub workflow_definition_id: &'a str,
    pub global_params: &'a Params,
}
