//! Tests for the validation rules, reports and debounced passes.
mod common;
use common::*;
use flowdraft::prelude::*;
use flowdraft::validator::{DebouncedValidator, fields};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_valid_graph_has_no_violations() {
    let (graph, ..) = create_linear_graph();
    assert!(validate(&graph).is_empty());
    assert!(validate(&create_fan_out_graph()).is_empty());
    assert!(validate(&Graph::new()).is_empty());
}

#[test]
fn test_duplicate_labels_flag_every_holder() {
    let mut graph = Graph::new();
    let first = add_task(&mut graph, TaskType::Function, "Task A");
    let second = add_task(&mut graph, TaskType::Function, "Task A");
    add_task(&mut graph, TaskType::Function, "Task B");

    let violations = validate(&graph);
    assert_eq!(violations.len(), 2);
    for (violation, id) in violations.iter().zip([&first.id, &second.id]) {
        assert_eq!(&violation.node_id, id);
        assert_eq!(violation.field, fields::LABEL);
        assert_eq!(violation.message, "Task name already exists");
    }
}

#[test]
fn test_label_uniqueness_is_case_sensitive() {
    let mut graph = Graph::new();
    add_task(&mut graph, TaskType::Function, "Task A");
    add_task(&mut graph, TaskType::Function, "task a");
    assert!(validate(&graph).is_empty());
}

#[test]
fn test_blank_label_is_required_not_duplicate() {
    let mut graph = Graph::new();
    let a = add_task(&mut graph, TaskType::Start, "  ");
    let b = add_task(&mut graph, TaskType::End, "  ");

    let violations = validate(&graph);
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| v.message == "Label is required"));
    assert_eq!(violations[0].node_id, a.id);
    assert_eq!(violations[1].node_id, b.id);
}

#[test]
fn test_empty_param_key_is_reported_once() {
    let mut graph = Graph::new();
    let node = add_task(&mut graph, TaskType::Function, "F");
    graph
        .update_node(&node.id, NodePatch::new().param("", json!(1)).param(" ", json!(2)))
        .unwrap();

    let violations = validate(&graph);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, fields::PARAMS);
    assert_eq!(violations[0].message, "Empty keys are not valid");
}

#[test]
fn test_wait_with_unknown_name() {
    let mut graph = Graph::new();
    let wait = add_task(&mut graph, TaskType::Wait, "Join");
    add_task(&mut graph, TaskType::Function, "A");
    graph
        .update_node(&wait.id, NodePatch::new().param("taskNames", json!(["A", "X", "X"])))
        .unwrap();

    let violations = validate(&graph);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].node_id, wait.id);
    assert_eq!(violations[0].field, fields::TASK_NAMES);
    assert_eq!(violations[0].message, "Unknown task(s): X");
}

#[test]
fn test_wait_cannot_reference_itself() {
    let mut graph = Graph::new();
    let wait = add_task(&mut graph, TaskType::Wait, "Join");
    graph
        .update_node(&wait.id, NodePatch::new().param("taskNames", json!(["Join"])))
        .unwrap();

    let violations = validate(&graph);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "Unknown task(s): Join");
}

#[test]
fn test_renaming_repairs_wait_reference() {
    let mut graph = Graph::new();
    let wait = add_task(&mut graph, TaskType::Wait, "Join");
    let target = add_task(&mut graph, TaskType::Function, "Old");
    graph
        .update_node(&wait.id, NodePatch::new().param("taskNames", json!(["New"])))
        .unwrap();
    assert_eq!(validate(&graph).len(), 1);

    graph.update_node(&target.id, NodePatch::new().label("New")).unwrap();
    assert!(validate(&graph).is_empty());
}

#[test]
fn test_wait_task_names_must_be_strings() {
    let mut graph = Graph::new();
    let wait = add_task(&mut graph, TaskType::Wait, "Join");
    graph
        .update_node(&wait.id, NodePatch::new().param("taskNames", json!("A")))
        .unwrap();

    let violations = validate(&graph);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, fields::TASK_NAMES);
    assert_eq!(violations[0].message, "Task names must be a list of task labels");
}

#[test]
fn test_listen_requires_api_key() {
    let mut graph = Graph::new();
    let listen = add_task(&mut graph, TaskType::Listen, "Hook");
    assert!(validate(&graph).is_empty());

    graph
        .update_node(&listen.id, NodePatch::new().param("apiKey", json!("")))
        .unwrap();
    let violations = validate(&graph);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, fields::API_KEY);
    assert_eq!(violations[0].message, "API Key is required");
}

#[test]
fn test_scripts_are_required_on_function_and_guard() {
    let mut graph = Graph::new();
    let guard = add_task(&mut graph, TaskType::Guard, "G");
    graph
        .update_node(&guard.id, NodePatch::new().exec("").exec_ts("   "))
        .unwrap();

    let report = standard().validate(&graph);
    let found: Vec<&str> = report.violations().iter().map(|v| v.field.as_str()).collect();
    assert_eq!(found, vec![fields::EXEC, fields::EXEC_TS]);
    assert_eq!(report.for_field(&guard.id, fields::EXEC).count(), 1);
}

#[test]
fn test_report_groups_by_node() {
    let mut graph = Graph::new();
    let a = add_task(&mut graph, TaskType::Function, "Dup");
    let b = add_task(&mut graph, TaskType::Function, "Dup");
    graph.update_node(&a.id, NodePatch::new().exec("")).unwrap();

    let report = standard().validate(&graph);
    assert_eq!(report.len(), 3);
    let groups = report.by_node();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].node_id, &a.id);
    assert_eq!(groups[0].violations.len(), 2);
    assert_eq!(groups[1].node_id, &b.id);
    assert_eq!(report.for_node(&b.id).count(), 1);
}

#[test]
fn test_custom_validator_runs_only_its_rules() {
    let mut graph = Graph::new();
    add_task(&mut graph, TaskType::Function, "Dup");
    add_task(&mut graph, TaskType::Function, "Dup");

    let validator = Validator::empty().with_rule(Box::new(flowdraft::validator::LabelRequiredRule));
    assert_eq!(validator.rule_names(), vec!["label-required"]);
    assert!(validator.validate(&graph).is_valid());
    assert_eq!(Validator::new().rule_names().len(), 6);
}

#[test]
fn test_formatter_lists_problems_per_task() {
    let mut graph = Graph::new();
    let a = add_task(&mut graph, TaskType::Function, "Task A");
    add_task(&mut graph, TaskType::Function, "Task A");

    let report = standard().validate(&graph);
    let text = ViolationFormatter::format_report(&report, &graph);
    assert!(text.starts_with("2 problem(s) in 2 task(s)"));
    assert!(text.contains(&format!("  Task A [FUNCTION] ({})", a.id)));
    assert!(text.contains("    - label: Task name already exists"));

    graph.remove_node(&a.id).unwrap();
    let text = ViolationFormatter::format_report(&report, &graph);
    assert!(text.contains(&format!("<removed> ({})", a.id)));

    let empty = ValidationReport::default();
    assert_eq!(ViolationFormatter::format_report(&empty, &graph), "No problems found");
}

#[test]
fn test_violations_serialize_camel_case() {
    let violation = Violation::new(&NodeId::from("n1"), fields::LABEL, "Label is required");
    let value = serde_json::to_value(&violation).unwrap();
    assert_eq!(
        value,
        json!({ "nodeId": "n1", "field": "label", "message": "Label is required" })
    );
}

#[tokio::test(start_paused = true)]
async fn test_debounce_delivers_only_the_last_pass() {
    let (mut debouncer, mut settled) =
        DebouncedValidator::new(Arc::new(Validator::new()), Duration::from_millis(500));
    let mut graph = Graph::new();
    let node = add_task(&mut graph, TaskType::Function, "");

    debouncer.schedule("label:n", &graph);
    tokio::time::sleep(Duration::from_millis(200)).await;
    graph.update_node(&node.id, NodePatch::new().label("Named")).unwrap();
    debouncer.schedule("label:n", &graph);
    assert_eq!(debouncer.pending(), 1);

    let result = settled.recv().await.unwrap();
    assert_eq!(result.key, "label:n");
    assert!(result.report.is_valid(), "Stale pass must not be delivered");

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert!(settled.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_debounce_keys_are_independent() {
    let (mut debouncer, mut settled) =
        DebouncedValidator::new(Arc::new(Validator::new()), Duration::from_millis(300));
    let (graph, ..) = create_linear_graph();

    debouncer.schedule("label:a", &graph);
    debouncer.schedule("label:b", &graph);

    let mut keys = vec![
        settled.recv().await.unwrap().key,
        settled.recv().await.unwrap().key,
    ];
    keys.sort();
    assert_eq!(keys, vec!["label:a", "label:b"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_pass_never_settles() {
    let (mut debouncer, mut settled) =
        DebouncedValidator::new(Arc::new(Validator::new()), Duration::from_millis(300));
    let graph = Graph::new();

    debouncer.schedule("graph", &graph);
    assert!(debouncer.cancel("graph"));
    assert!(!debouncer.cancel("graph"));

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(settled.try_recv().is_err());
    assert_eq!(debouncer.pending(), 0);
}
