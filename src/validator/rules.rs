use super::{ValidationRule, Violation, fields};
use crate::graph::{Graph, NodeId};
use crate::task::TaskParams;
use ahash::AHashMap;
use itertools::Itertools;

/// Every node needs a non-blank label.
pub struct LabelRequiredRule;

impl ValidationRule for LabelRequiredRule {
    fn name(&self) -> &str {
        "label-required"
    }

    fn check(&self, graph: &Graph, violations: &mut Vec<Violation>) {
        for node in graph.nodes() {
            if node.label.trim().is_empty() {
                violations.push(Violation::new(node.id(), fields::LABEL, "Label is required"));
            }
        }
    }
}

/// Labels are task names in the compiled definition and must be unique (exact match).
///
/// Every node sharing a label is reported, not only the later ones. Blank labels are
/// left to [`LabelRequiredRule`].
pub struct LabelUniqueRule;

impl ValidationRule for LabelUniqueRule {
    fn name(&self) -> &str {
        "label-unique"
    }

    fn check(&self, graph: &Graph, violations: &mut Vec<Violation>) {
        let counts = graph.nodes().iter().map(|n| n.label.as_str()).counts();
        for node in graph.nodes() {
            if node.label.trim().is_empty() {
                continue;
            }
            if counts.get(node.label.as_str()).copied().unwrap_or(0) > 1 {
                violations.push(Violation::new(
                    node.id(),
                    fields::LABEL,
                    "Task name already exists",
                ));
            }
        }
    }
}

/// No params key may be empty after trimming.
pub struct ParamKeysRule;

impl ValidationRule for ParamKeysRule {
    fn name(&self) -> &str {
        "param-keys"
    }

    fn check(&self, graph: &Graph, violations: &mut Vec<Violation>) {
        for node in graph.nodes() {
            if node.params.keys().any(|k| k.trim().is_empty()) {
                violations.push(Violation::new(
                    node.id(),
                    fields::PARAMS,
                    "Empty keys are not valid",
                ));
            }
        }
    }
}

/// The params map must have the shape its task type reads (WAIT list, LISTEN key).
pub struct TaskParamsRule;

impl ValidationRule for TaskParamsRule {
    fn name(&self) -> &str {
        "task-params"
    }

    fn check(&self, graph: &Graph, violations: &mut Vec<Violation>) {
        for node in graph.nodes() {
            if let Err(issue) = TaskParams::narrow(node.task_type(), &node.params) {
                violations.push(Violation::new(node.id(), issue.field(), issue.message()));
            }
        }
    }
}

/// A WAIT task's `taskNames` must each name some other node of the graph.
///
/// These are soft references by label: renaming any node can break or repair them, so
/// the rule always looks at the current labels. All unknown names of one node are
/// reported in a single violation.
pub struct WaitReferencesRule;

impl ValidationRule for WaitReferencesRule {
    fn name(&self) -> &str {
        "wait-references"
    }

    fn check(&self, graph: &Graph, violations: &mut Vec<Violation>) {
        let mut owners: AHashMap<&str, Vec<&NodeId>> = AHashMap::new();
        for node in graph.nodes() {
            owners.entry(node.label.as_str()).or_default().push(node.id());
        }

        for node in graph.nodes() {
            // Shape problems are reported by `TaskParamsRule`.
            let Ok(TaskParams::Wait { task_names }) =
                TaskParams::narrow(node.task_type(), &node.params)
            else {
                continue;
            };

            let unknown: Vec<&str> = task_names
                .into_iter()
                .filter(|name| {
                    !owners
                        .get(name)
                        .is_some_and(|ids| ids.iter().any(|id| *id != node.id()))
                })
                .unique()
                .collect();

            if !unknown.is_empty() {
                violations.push(Violation::new(
                    node.id(),
                    fields::TASK_NAMES,
                    format!("Unknown task(s): {}", unknown.join(", ")),
                ));
            }
        }
    }
}

/// FUNCTION and GUARD tasks need both the executable script and its source.
pub struct ScriptRequiredRule;

impl ValidationRule for ScriptRequiredRule {
    fn name(&self) -> &str {
        "script-required"
    }

    fn check(&self, graph: &Graph, violations: &mut Vec<Violation>) {
        for node in graph.nodes().iter().filter(|n| n.task_type().is_scriptable()) {
            if is_blank(node.exec.as_deref()) {
                violations.push(Violation::new(node.id(), fields::EXEC, "Script is required"));
            }
            if is_blank(node.exec_ts.as_deref()) {
                violations.push(Violation::new(
                    node.id(),
                    fields::EXEC_TS,
                    "Script source is required",
                ));
            }
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
