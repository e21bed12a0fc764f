//! # Flowdraft - Workflow Graph Compiler and Validator
//!
//! **Flowdraft** turns a visually authored workflow graph into the declarative
//! workflow definition a runtime executes. Tasks are nodes, ordering edges connect an
//! output port to an input port, and every task may carry parameters and, for
//! `FUNCTION` and `GUARD` tasks, a TypeScript script.
//!
//! ## Core Workflow
//!
//! 1.  **Build or load a graph**: Edit a [`Graph`](graph::Graph) directly, or restore one
//!     from an editor snapshot through the [`IntoGraph`](snapshot::IntoGraph) trait.
//! 2.  **Validate**: Run the [`validator`] for a full list of violations, immediately or
//!     debounced while the user types.
//! 3.  **Compile**: Use `Compiler::builder` to turn a valid graph and its metadata into a
//!     [`WorkflowDefinition`](compiler::WorkflowDefinition) with `next`/`previous` task names.
//! 4.  **Submit**: Hand the definition and the editor snapshot to a
//!     [`DefinitionStore`](client::DefinitionStore), usually through an
//!     [`EditingSession`](session::EditingSession).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowdraft::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut graph = Graph::new();
//!     let start = graph.add_node(TaskType::Start).output_port().cloned();
//!     let function = graph.add_node(TaskType::Function);
//!     let (function_id, function_in) = (function.id().clone(), function.input_port().cloned());
//!
//!     if let (Some(from), Some(to)) = (start, function_in) {
//!         graph.connect(&from, &to)?;
//!     }
//!     apply_script_edit(&mut graph, &function_id, "const x: number = 1;", &TypeStripper)?;
//!
//!     let violations = validate(&graph);
//!     if !violations.is_empty() {
//!         println!("{} problem(s) left", violations.len());
//!         return Ok(());
//!     }
//!
//!     let metadata = WorkflowMetadata::new("Example", "A two task workflow");
//!     let definition = Compiler::builder(&graph, &metadata).build().compile()?;
//!     println!("{}", serde_json::to_string_pretty(&definition)?);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod compiler;
pub mod config;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod script;
pub mod session;
pub mod snapshot;
pub mod task;
pub mod validator;
