//! The scripting contract of FUNCTION and GUARD tasks.
//!
//! A script author sees a generated declaration surface ([`ScriptContract`]) built
//! from the workflow's global map and the task's own params, and writes TypeScript.
//! Every edit stores the source as `execTs` and, when it transpiles, the result as
//! `exec`. A failed transpile leaves the last good `exec` in place.

use crate::error::{GraphError, ScriptError};
use crate::graph::{Graph, Node, NodeId, NodePatch, Params};
use serde_json::Value;

pub mod builtins;
mod infer;
mod transpile;

pub use builtins::HttpMethod;
pub use infer::TypeInferrer;
pub use transpile::{ScriptTranspiler, TypeStripper};

const TRACING_TARGET: &str = "flowdraft::script";

/// Ambient declarations for one task script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptContract {
    /// `interface GlobalMap` and the interfaces it refers to.
    pub global_types: String,
    /// `interface ParamMap` and the interfaces it refers to.
    pub params_types: String,
    /// Platform built-ins, identical for every task.
    pub builtins: String,
}

impl ScriptContract {
    /// Infers the contract from example values of the global map and the task params.
    ///
    /// Pass both maps explicitly on every change; nothing is cached between calls.
    pub fn generate(global: &Params, params: &Params) -> Self {
        Self {
            global_types: TypeInferrer::new()
                .infer(builtins::GLOBAL_MAP, &Value::Object(global.clone())),
            params_types: TypeInferrer::new()
                .infer(builtins::PARAM_MAP, &Value::Object(params.clone())),
            builtins: builtins::declarations(),
        }
    }

    /// The contract of a scriptable node.
    pub fn for_node(node: &Node, global: &Params) -> Result<Self, ScriptError> {
        if !node.task_type().is_scriptable() {
            return Err(ScriptError::NotScriptable(node.id().clone()));
        }
        Ok(Self::generate(global, &node.params))
    }

    /// The complete declaration file handed to an editor.
    pub fn declarations(&self) -> String {
        format!(
            "{}\n{}\n{}",
            self.global_types, self.params_types, self.builtins
        )
    }
}

/// Result of storing an edited script on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEditOutcome {
    /// Set when the source did not transpile. `exec` was left untouched.
    pub error: Option<ScriptError>,
}

impl ScriptEditOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Stores `source` as the node's `execTs` and its transpiled form as `exec`.
///
/// Errors are returned only for a missing or non-scriptable node. A transpile
/// failure is reported in the outcome instead, with `exec` unchanged.
pub fn apply_script_edit(
    graph: &mut Graph,
    node_id: &NodeId,
    source: &str,
    transpiler: &dyn ScriptTranspiler,
) -> Result<ScriptEditOutcome, ScriptError> {
    let node = graph
        .node(node_id)
        .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
    if !node.task_type().is_scriptable() {
        return Err(ScriptError::NotScriptable(node_id.clone()));
    }

    let patch = NodePatch::new().exec_ts(source);
    let (patch, error) = match transpiler.transpile(source) {
        Ok(exec) => (patch.exec(exec), None),
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                node_id = %node_id,
                error = %error,
                "Script did not transpile, keeping previous executable"
            );
            (patch, Some(error))
        }
    };

    graph.update_node(node_id, patch)?;
    Ok(ScriptEditOutcome { error })
}
