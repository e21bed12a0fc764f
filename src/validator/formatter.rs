use super::ValidationReport;
use crate::graph::Graph;

/// Formats validation reports into human-readable summaries.
pub struct ViolationFormatter;

impl ViolationFormatter {
    /// One block per node, in order of first violation:
    ///
    /// ```text
    /// 2 problem(s) in 1 task(s)
    ///   Task A [FUNCTION] (node-1)
    ///     - label: Task name already exists
    ///     - exec: Script is required
    /// ```
    pub fn format_report(report: &ValidationReport, graph: &Graph) -> String {
        if report.is_valid() {
            return "No problems found".to_string();
        }

        let groups = report.by_node();
        let mut result = format!(
            "{} problem(s) in {} task(s)",
            report.len(),
            groups.len()
        );

        for group in groups {
            result.push_str("\n  ");
            match graph.node(group.node_id) {
                Some(node) => {
                    let label = if node.label.trim().is_empty() {
                        "<unnamed>"
                    } else {
                        node.label.as_str()
                    };
                    result.push_str(&format!(
                        "{} [{}] ({})",
                        label,
                        node.task_type(),
                        group.node_id
                    ));
                }
                // The graph may have moved on since the report was produced.
                None => result.push_str(&format!("<removed> ({})", group.node_id)),
            }
            for violation in group.violations {
                result.push_str(&format!("\n    - {}: {}", violation.field, violation.message));
            }
        }
        result
    }
}
