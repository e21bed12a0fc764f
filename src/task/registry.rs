use super::{PortLayout, TaskType};
use crate::graph::Params;
use serde_json::{Value, json};
use std::sync::LazyLock;
use uuid::Uuid;

/// Data a freshly created node of a given type starts out with.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefaults {
    pub params: Params,
    pub exec: Option<String>,
    pub exec_ts: Option<String>,
}

/// Static description of one task type.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    pub task_type: TaskType,
    pub ports: PortLayout,
    /// Human readable prefix of generated labels, e.g. `"Function"`.
    pub label_prefix: &'static str,
    defaults: fn() -> TaskDefaults,
}

impl TaskSpec {
    /// Produces fresh default data. Called once per node creation, so generated
    /// values (such as a LISTEN api key) are never shared between nodes.
    pub fn defaults(&self) -> TaskDefaults {
        (self.defaults)()
    }

    /// A fresh, practically unique label like `"Wait 1b4e28ba-..."`.
    pub fn default_label(&self) -> String {
        format!("{} {}", self.label_prefix, Uuid::new_v4())
    }
}

/// Lookup table from [`TaskType`] to its [`TaskSpec`].
#[derive(Debug)]
pub struct TaskRegistry {
    specs: [TaskSpec; 6],
}

impl TaskRegistry {
    pub fn spec(&self, task_type: TaskType) -> &TaskSpec {
        &self.specs[task_type as usize]
    }

    pub fn specs(&self) -> impl Iterator<Item = &TaskSpec> {
        self.specs.iter()
    }
}

static REGISTRY: LazyLock<TaskRegistry> = LazyLock::new(|| TaskRegistry {
    specs: build_specs(),
});

/// The process-wide task registry. Built on first access, read-only afterwards.
pub fn registry() -> &'static TaskRegistry {
    &REGISTRY
}

/// Defines the `TaskSpec` table. Entries must follow the declaration order of [`TaskType`].
macro_rules! define_task_specs {
    ( $( ($variant:ident, $prefix:expr, input: $input:expr, output: $output:expr, defaults: $defaults:expr) ),* $(,)? ) => {
        fn build_specs() -> [TaskSpec; 6] {
            [
                $(
                    TaskSpec {
                        task_type: TaskType::$variant,
                        ports: PortLayout { has_input: $input, has_output: $output },
                        label_prefix: $prefix,
                        defaults: $defaults,
                    },
                )*
            ]
        }
    };
}

define_task_specs! {
    (Start, "Start", input: false, output: true, defaults: plain_defaults),
    (End, "End", input: true, output: false, defaults: plain_defaults),
    (Function, "Function", input: true, output: true, defaults: function_defaults),
    (Guard, "Guard", input: true, output: true, defaults: guard_defaults),
    (Wait, "Wait", input: true, output: true, defaults: wait_defaults),
    (Listen, "Listen", input: true, output: false, defaults: listen_defaults),
}

const FUNCTION_EXEC_TS: &str = r#"/**
 * Return any JSON-serializable value; it becomes this task's result.
 */
async function handler(): Promise<Record<string, any>> {
  return { "hello": "world" };
}
"#;

const FUNCTION_EXEC: &str = r#"/**
 * Return any JSON-serializable value; it becomes this task's result.
 */
async function handler() {
  return { "hello": "world" };
}
"#;

const GUARD_EXEC_TS: &str = r#"/**
 * Resolve to `true` to let the workflow continue past this guard.
 */
async function handler(): Promise<boolean> {
  return true;
}
"#;

const GUARD_EXEC: &str = r#"/**
 * Resolve to `true` to let the workflow continue past this guard.
 */
async function handler() {
  return true;
}
"#;

fn plain_defaults() -> TaskDefaults {
    TaskDefaults {
        params: Params::new(),
        exec: None,
        exec_ts: None,
    }
}

fn function_defaults() -> TaskDefaults {
    TaskDefaults {
        params: Params::new(),
        exec: Some(FUNCTION_EXEC.to_string()),
        exec_ts: Some(FUNCTION_EXEC_TS.to_string()),
    }
}

fn guard_defaults() -> TaskDefaults {
    TaskDefaults {
        params: Params::new(),
        exec: Some(GUARD_EXEC.to_string()),
        exec_ts: Some(GUARD_EXEC_TS.to_string()),
    }
}

fn wait_defaults() -> TaskDefaults {
    let mut params = Params::new();
    params.insert("taskNames".to_string(), json!([]));
    TaskDefaults {
        params,
        exec: None,
        exec_ts: None,
    }
}

fn listen_defaults() -> TaskDefaults {
    let mut params = Params::new();
    params.insert(
        "apiKey".to_string(),
        Value::String(Uuid::new_v4().to_string()),
    );
    TaskDefaults {
        params,
        exec: None,
        exec_ts: None,
    }
}
