//! One user's editing session over one workflow draft.
//!
//! The session exclusively owns its [`Graph`]. Mutations are synchronous; each one
//! schedules a debounced validation pass keyed by what it touched. Submission
//! compiles the current graph and hands it to a [`DefinitionStore`], at most one
//! submission at a time.

use crate::client::{DefinitionDraft, DefinitionStore, StoredDefinition};
use crate::compiler::{Compiler, WorkflowDefinition, WorkflowMetadata};
use crate::config::Config;
use crate::error::{CompileError, GraphError, ScriptError, SnapshotError, SubmitError};
use crate::graph::{EdgeId, Graph, Node, NodeId, NodePatch, Params, PortId};
use crate::script::{self, ScriptContract, ScriptEditOutcome, ScriptTranspiler, TypeStripper};
use crate::snapshot::{IntoGraph, UiSnapshot};
use crate::task::TaskType;
use crate::validator::{DebouncedValidator, SettledValidation, ValidationReport, Validator};
use ahash::AHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

mod json_input;

pub use json_input::{format_json_object, parse_json_object};

const TRACING_TARGET: &str = "flowdraft::session";

/// Debounce key for edits that change the graph's structure.
pub const GRAPH_KEY: &str = "graph";

/// Debounce key for an edit of one node field, e.g. `"label:<node id>"`.
pub fn field_key(field: &str, node_id: &NodeId) -> String {
    format!("{}:{}", field, node_id)
}

/// How a successful submission was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Created,
    Updated(String),
}

pub struct EditingSession {
    graph: Graph,
    metadata: WorkflowMetadata,
    definition_id: Option<String>,
    validator: Arc<Validator>,
    debouncer: Option<DebouncedValidator>,
    transpiler: Box<dyn ScriptTranspiler>,
    script_errors: AHashMap<NodeId, ScriptError>,
    submitting: AtomicBool,
}

impl EditingSession {
    /// A session over an empty draft.
    pub fn new(metadata: WorkflowMetadata) -> Self {
        Self::from_graph(Graph::new(), metadata)
    }

    pub fn from_graph(graph: Graph, metadata: WorkflowMetadata) -> Self {
        Self {
            graph,
            metadata,
            definition_id: None,
            validator: Arc::new(Validator::default()),
            debouncer: None,
            transpiler: Box::new(TypeStripper),
            script_errors: AHashMap::new(),
            submitting: AtomicBool::new(false),
        }
    }

    /// Reopens a stored definition from its editor snapshot.
    pub fn open(stored: &StoredDefinition) -> Result<Self, SnapshotError> {
        let graph = match stored.snapshot() {
            Some(snapshot) => snapshot.clone().into_graph()?,
            None => Graph::new(),
        };
        let mut session = Self::from_graph(graph, stored.metadata());
        session.definition_id = Some(stored.id.clone());
        tracing::debug!(
            target: TRACING_TARGET,
            definition_id = %stored.id,
            nodes = session.graph.len(),
            "Opened stored definition"
        );
        Ok(session)
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_transpiler(mut self, transpiler: Box<dyn ScriptTranspiler>) -> Self {
        self.transpiler = transpiler;
        self
    }

    /// Enables debounced validation with the delay from `config`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn with_config(self, config: &Config) -> (Self, mpsc::UnboundedReceiver<SettledValidation>) {
        self.with_debounce(config.validation_debounce())
    }

    /// Enables debounced validation. Settled reports arrive on the returned receiver.
    ///
    /// Passes run on the tokio runtime this is called from, so later mutations may
    /// happen outside of it.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn with_debounce(
        mut self,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SettledValidation>) {
        let (debouncer, settled) = DebouncedValidator::new(Arc::clone(&self.validator), delay);
        self.debouncer = Some(debouncer);
        (self, settled)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn metadata(&self) -> &WorkflowMetadata {
        &self.metadata
    }

    pub fn definition_id(&self) -> Option<&str> {
        self.definition_id.as_deref()
    }

    pub fn set_metadata(&mut self, metadata: WorkflowMetadata) {
        self.metadata = metadata;
    }

    // Graph mutations

    pub fn add_node(&mut self, task_type: TaskType) -> NodeId {
        let id = self.graph.add_node(task_type).id().clone();
        self.schedule(GRAPH_KEY.to_string());
        id
    }

    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<Node, GraphError> {
        let node = self.graph.remove_node(node_id)?;
        self.script_errors.remove(node_id);
        self.schedule(GRAPH_KEY.to_string());
        Ok(node)
    }

    pub fn connect(&mut self, source_port: &PortId, target_port: &PortId) -> Result<EdgeId, GraphError> {
        let id = self.graph.connect(source_port, target_port)?.id().clone();
        self.schedule(GRAPH_KEY.to_string());
        Ok(id)
    }

    pub fn disconnect(&mut self, edge_id: &EdgeId) -> Result<(), GraphError> {
        self.graph.disconnect(edge_id)?;
        self.schedule(GRAPH_KEY.to_string());
        Ok(())
    }

    pub fn update_node(&mut self, node_id: &NodeId, patch: NodePatch) -> Result<(), GraphError> {
        let touched = patch.touched_fields();
        self.graph.update_node(node_id, patch)?;
        for field in touched {
            self.schedule(field_key(field, node_id));
        }
        Ok(())
    }

    /// Replaces the node's params with `params`, e.g. after a JSON edit.
    pub fn replace_params(&mut self, node_id: &NodeId, params: Params) -> Result<(), GraphError> {
        let node = self
            .graph
            .node(node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        let mut patch = NodePatch::new();
        for key in node.params.keys().filter(|k| !params.contains_key(*k)) {
            patch = patch.remove_param(key.clone());
        }
        patch.params = params;
        self.update_node(node_id, patch)
    }

    /// Stores an edited script. A transpile failure is remembered for the node until
    /// the next successful edit.
    pub fn edit_script(&mut self, node_id: &NodeId, source: &str) -> Result<ScriptEditOutcome, ScriptError> {
        let outcome = script::apply_script_edit(&mut self.graph, node_id, source, self.transpiler.as_ref())?;
        match &outcome.error {
            Some(error) => {
                self.script_errors.insert(node_id.clone(), error.clone());
            }
            None => {
                self.script_errors.remove(node_id);
                self.schedule(field_key("exec", node_id));
            }
        }
        self.schedule(field_key("execTs", node_id));
        Ok(outcome)
    }

    pub fn script_error(&self, node_id: &NodeId) -> Option<&ScriptError> {
        self.script_errors.get(node_id)
    }

    /// The declaration surface for a scriptable node, from the current global map.
    pub fn script_contract(&self, node_id: &NodeId) -> Result<ScriptContract, ScriptError> {
        let node = self
            .graph
            .node(node_id)
            .ok_or_else(|| GraphError::UnknownNode(node_id.clone()))?;
        ScriptContract::for_node(node, &self.metadata.global)
    }

    // Validation and compilation

    /// Runs a full validation pass right now.
    pub fn validate_now(&self) -> ValidationReport {
        self.validator.validate(&self.graph)
    }

    pub fn compile(&self) -> Result<WorkflowDefinition, CompileError> {
        Compiler::builder(&self.graph, &self.metadata)
            .with_validator(&self.validator)
            .build()
            .compile()
    }

    pub fn snapshot(&self) -> UiSnapshot {
        UiSnapshot::from_graph(&self.graph)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Compiles and stores the draft: an update when the session was opened from a
    /// stored definition, a create otherwise.
    ///
    /// Fails with [`SubmitError::InFlight`] while another submission is running. The
    /// graph is never changed, so a failed submission can simply be retried.
    pub async fn submit(&self, store: &dyn DefinitionStore) -> Result<Submitted, SubmitError> {
        let _guard = SubmitGuard::acquire(&self.submitting)?;

        let draft = DefinitionDraft::new(self.compile()?, self.snapshot());
        tracing::info!(
            target: TRACING_TARGET,
            workflow = %draft.workflow.name,
            tasks = draft.workflow.tasks.len(),
            "Submitting workflow"
        );

        let submitted = match &self.definition_id {
            Some(id) => {
                store.update(id, &draft).await?;
                Submitted::Updated(id.clone())
            }
            None => {
                store.create(&draft).await?;
                Submitted::Created
            }
        };
        Ok(submitted)
    }

    /// Ends the session. Pending validation passes are cancelled, nothing is persisted.
    pub fn close(mut self) {
        if let Some(debouncer) = self.debouncer.as_mut() {
            debouncer.cancel_all();
        }
        tracing::debug!(
            target: TRACING_TARGET,
            nodes = self.graph.len(),
            "Closed editing session"
        );
    }

    fn schedule(&mut self, key: String) {
        if let Some(debouncer) = self.debouncer.as_mut() {
            debouncer.schedule(key, &self.graph);
        }
    }
}

/// Holds the submission flag for as long as one submission runs.
struct SubmitGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SubmitError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(target: TRACING_TARGET, "Submission already in flight");
            return Err(SubmitError::InFlight);
        }
        Ok(Self { flag })
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
