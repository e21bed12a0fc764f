//! Semantic validation of a workflow graph.
//!
//! Violations are data, never errors: every rule runs, every violation is kept, and
//! the caller renders them all at once. Use [`validate`] for an immediate pass and
//! [`DebouncedValidator`] while the user is still typing.

use crate::graph::{Graph, NodeId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

mod debounce;
mod formatter;
mod rules;

pub use debounce::{DEFAULT_DEBOUNCE, DebouncedValidator, SettledValidation};
pub use formatter::ViolationFormatter;
pub use rules::{
    LabelRequiredRule, LabelUniqueRule, ParamKeysRule, ScriptRequiredRule, TaskParamsRule,
    WaitReferencesRule,
};

/// Field paths used in [`Violation::field`].
pub mod fields {
    pub const LABEL: &str = "label";
    pub const PARAMS: &str = "params";
    pub const TASK_NAMES: &str = "params.taskNames";
    pub const API_KEY: &str = "params.apiKey";
    pub const EXEC: &str = "exec";
    pub const EXEC_TS: &str = "execTs";
}

/// A single reported validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub node_id: NodeId,
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(node_id: &NodeId, field: &str, message: impl Into<String>) -> Self {
        Self {
            node_id: node_id.clone(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Defines the contract for one independent validation check.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, graph: &Graph, violations: &mut Vec<Violation>);
}

/// Runs a set of rules over a graph.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::empty()
            .with_rule(Box::new(LabelRequiredRule))
            .with_rule(Box::new(LabelUniqueRule))
            .with_rule(Box::new(ParamKeysRule))
            .with_rule(Box::new(TaskParamsRule))
            .with_rule(Box::new(WaitReferencesRule))
            .with_rule(Box::new(ScriptRequiredRule))
    }
}

impl Validator {
    /// A validator with the standard rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator with no rules at all.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: Box<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn validate(&self, graph: &Graph) -> ValidationReport {
        let mut violations = Vec::new();
        for rule in &self.rules {
            rule.check(graph, &mut violations);
        }
        ValidationReport { violations }
    }
}

static STANDARD: LazyLock<Validator> = LazyLock::new(Validator::default);

/// The shared validator with the standard rule set.
pub fn standard() -> &'static Validator {
    &STANDARD
}

/// Validates `graph` with the standard rule set.
pub fn validate(graph: &Graph) -> Vec<Violation> {
    STANDARD.validate(graph).into_violations()
}

/// All violations found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

/// The violations of one node, for per-node summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeViolations<'a> {
    pub node_id: &'a NodeId,
    pub violations: Vec<&'a Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Total error count. Always equal to the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn for_node<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| &v.node_id == node_id)
    }

    pub fn for_field<'a>(
        &'a self,
        node_id: &'a NodeId,
        field: &'a str,
    ) -> impl Iterator<Item = &'a Violation> + 'a {
        self.for_node(node_id).filter(move |v| v.field == field)
    }

    /// Groups violations per node, in order of first appearance.
    pub fn by_node(&self) -> Vec<NodeViolations<'_>> {
        self.violations
            .iter()
            .map(|v| &v.node_id)
            .unique()
            .map(|node_id| NodeViolations {
                node_id,
                violations: self.for_node(node_id).collect(),
            })
            .collect()
    }
}
