//! Projects a valid graph into a portable [`WorkflowDefinition`].

use crate::error::CompileError;
use crate::graph::{Graph, Node};
use crate::validator::{self, Validator};

mod definition;
mod resolve;

pub use definition::{CompiledTask, WorkflowDefinition, WorkflowMetadata, WorkflowStatus};

use resolve::ConnectionResolver;

const TRACING_TARGET: &str = "flowdraft::compiler";

pub struct Compiler<'a> {
    graph: &'a Graph,
    metadata: &'a WorkflowMetadata,
    validator: Option<&'a Validator>,
}

pub struct CompilerBuilder<'a> {
    graph: &'a Graph,
    metadata: &'a WorkflowMetadata,
    validator: Option<&'a Validator>,
}

impl<'a> CompilerBuilder<'a> {
    pub fn new(graph: &'a Graph, metadata: &'a WorkflowMetadata) -> Self {
        Self {
            graph,
            metadata,
            validator: None,
        }
    }

    /// Checks the graph with `validator` instead of the standard rule set.
    pub fn with_validator(mut self, validator: &'a Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn build(self) -> Compiler<'a> {
        Compiler {
            graph: self.graph,
            metadata: self.metadata,
            validator: self.validator,
        }
    }
}

impl<'a> Compiler<'a> {
    pub fn builder(graph: &'a Graph, metadata: &'a WorkflowMetadata) -> CompilerBuilder<'a> {
        CompilerBuilder::new(graph, metadata)
    }

    /// Validates, then compiles. Nothing is emitted for an invalid graph or metadata.
    pub fn compile(&self) -> Result<WorkflowDefinition, CompileError> {
        let validator = self.validator.unwrap_or_else(|| validator::standard());
        let report = validator.validate(self.graph);
        if !report.is_valid() {
            tracing::warn!(
                target: TRACING_TARGET,
                violations = report.len(),
                "Refusing to compile an invalid graph"
            );
            return Err(CompileError::CompileOnInvalidGraph {
                violations: report.into_violations(),
            });
        }

        let problems = self.metadata.validate();
        if !problems.is_empty() {
            return Err(CompileError::InvalidMetadata { problems });
        }

        let resolver = ConnectionResolver::new(self.graph);
        let tasks: Vec<CompiledTask> = self
            .graph
            .nodes()
            .iter()
            .map(|node| Self::compile_task(node, &resolver))
            .collect();

        tracing::debug!(
            target: TRACING_TARGET,
            workflow = %self.metadata.name,
            tasks = tasks.len(),
            edges = self.graph.edges().len(),
            "Compiled workflow definition"
        );

        Ok(WorkflowDefinition {
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            status: self.metadata.status,
            global: self.metadata.global.clone(),
            tasks,
        })
    }

    fn compile_task(node: &Node, resolver: &ConnectionResolver<'_>) -> CompiledTask {
        CompiledTask {
            id: node.id().clone(),
            name: node.label.clone(),
            task_type: node.task_type(),
            params: node.params.clone(),
            next: resolver.next(node),
            previous: resolver.previous(node),
            exec: non_empty(node.exec.as_deref()),
            exec_ts: non_empty(node.exec_ts.as_deref()),
        }
    }
}

/// Compiles `graph` with the standard validator.
pub fn compile(
    graph: &Graph,
    metadata: &WorkflowMetadata,
) -> Result<WorkflowDefinition, CompileError> {
    Compiler::builder(graph, metadata).build().compile()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}
