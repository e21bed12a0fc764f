use super::TaskType;
use crate::graph::Params;
use serde_json::Value;

/// A node's open `params` map narrowed to the shape its task type expects.
///
/// The map itself stays free-form so unknown keys survive a round trip; only the
/// keys a consumer relies on are checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskParams<'a> {
    Start,
    End,
    Function,
    Guard,
    /// Soft references to other tasks, by label.
    Wait { task_names: Vec<&'a str> },
    Listen { api_key: &'a str },
}

/// Why a params map does not fit its task type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamsIssue {
    TaskNamesNotAList,
    ApiKeyMissing,
}

impl ParamsIssue {
    /// The violated field path, as reported by the validator.
    pub fn field(&self) -> &'static str {
        match self {
            ParamsIssue::TaskNamesNotAList => "params.taskNames",
            ParamsIssue::ApiKeyMissing => "params.apiKey",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ParamsIssue::TaskNamesNotAList => "Task names must be a list of task labels",
            ParamsIssue::ApiKeyMissing => "API Key is required",
        }
    }
}

impl<'a> TaskParams<'a> {
    pub fn narrow(task_type: TaskType, params: &'a Params) -> Result<Self, ParamsIssue> {
        match task_type {
            TaskType::Start => Ok(TaskParams::Start),
            TaskType::End => Ok(TaskParams::End),
            TaskType::Function => Ok(TaskParams::Function),
            TaskType::Guard => Ok(TaskParams::Guard),
            TaskType::Wait => {
                let task_names = match params.get("taskNames") {
                    // A missing list is treated as "waits on nothing".
                    None => Vec::new(),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| item.as_str().ok_or(ParamsIssue::TaskNamesNotAList))
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(_) => return Err(ParamsIssue::TaskNamesNotAList),
                };
                Ok(TaskParams::Wait { task_names })
            }
            TaskType::Listen => match params.get("apiKey").and_then(Value::as_str) {
                Some(key) if !key.trim().is_empty() => Ok(TaskParams::Listen { api_key: key }),
                _ => Err(ParamsIssue::ApiKeyMissing),
            },
        }
    }
}
