//! Prelude module for convenient imports
//!
//! Re-exports the types most callers need to build, validate and compile a workflow.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowdraft::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let snapshot_json = std::fs::read_to_string("path/to/snapshot.json")?;
//! let graph = UiSnapshot::from_json(&snapshot_json)?.into_graph()?;
//!
//! let report = standard().validate(&graph);
//! println!("{}", ViolationFormatter::format_report(&report, &graph));
//!
//! let metadata = WorkflowMetadata::new("Nightly import", "Imports yesterday's orders");
//! let definition = compile(&graph, &metadata)?;
//! println!("{} task(s)", definition.tasks.len());
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::graph::{Edge, EdgeId, Graph, Node, NodeId, NodePatch, Params, PortId, Position};
pub use crate::task::{TaskParams, TaskType};

// Validation
pub use crate::validator::{
    ValidationReport, ValidationRule, Validator, Violation, ViolationFormatter, standard,
    validate,
};

// Compilation
pub use crate::compiler::{
    CompiledTask, Compiler, WorkflowDefinition, WorkflowMetadata, WorkflowStatus, compile,
};

// Scripts
pub use crate::script::{ScriptContract, ScriptTranspiler, TypeStripper, apply_script_edit};

// Snapshots and sessions
pub use crate::session::EditingSession;
pub use crate::snapshot::{IntoGraph, UiSnapshot};

// Error types
pub use crate::error::{CompileError, GraphError, ScriptError, SnapshotError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
