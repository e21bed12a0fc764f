//! Tests for compiling graphs into workflow definitions.
mod common;
use common::*;
use flowdraft::prelude::*;
use serde_json::json;

#[test]
fn test_compiler_resolves_linear_graph() {
    let (graph, ..) = create_linear_graph();
    let metadata = create_metadata();
    let definition = Compiler::builder(&graph, &metadata)
        .build()
        .compile()
        .expect("Failed to compile");

    assert_eq!(definition.name, "Orders");
    assert_eq!(definition.status, WorkflowStatus::Active);
    assert_eq!(definition.tasks.len(), 3);

    let s = definition.task("S").unwrap();
    assert!(s.previous.is_empty());
    assert_eq!(s.next, vec!["F"]);

    let f = definition.task("F").unwrap();
    assert_eq!(f.previous, vec!["S"]);
    assert_eq!(f.next, vec!["E"]);
    assert!(f.exec.is_some() && f.exec_ts.is_some());

    let e = definition.task("E").unwrap();
    assert_eq!(e.previous, vec!["F"]);
    assert!(e.next.is_empty());
    assert!(e.exec.is_none());
    assert!(definition.dangling_references().is_empty());
}

#[test]
fn test_compiler_keeps_node_order_and_ids() {
    let (graph, start, function, end) = create_linear_graph();
    let definition = compile(&graph, &create_metadata()).unwrap();
    let ids: Vec<&NodeId> = definition.tasks.iter().map(|t| &t.id).collect();
    assert_eq!(ids, vec![&start.id, &function.id, &end.id]);
}

#[test]
fn test_compiler_fans_out_in_edge_order() {
    let graph = create_fan_out_graph();
    let definition = compile(&graph, &create_metadata()).unwrap();

    assert_eq!(definition.task("S").unwrap().next, vec!["A", "B"]);
    assert_eq!(definition.task("B").unwrap().next, Vec::<String>::new());
    let join = definition.task("Join").unwrap();
    assert_eq!(join.previous, vec!["A"]);
    assert_eq!(join.params.get("taskNames"), Some(&json!(["A", "B"])));
}

#[test]
fn test_compiler_is_deterministic() {
    let graph = create_fan_out_graph();
    let metadata = create_metadata();
    let first = serde_json::to_string(&compile(&graph, &metadata).unwrap()).unwrap();
    let second = serde_json::to_string(&compile(&graph, &metadata).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_compiler_refuses_invalid_graph() {
    let (mut graph, _, function, _) = create_linear_graph();
    graph.update_node(&function.id, NodePatch::new().label("S")).unwrap();

    match compile(&graph, &create_metadata()) {
        Err(CompileError::CompileOnInvalidGraph { violations }) => {
            assert_eq!(violations.len(), 2);
            assert!(violations.iter().all(|v| v.message == "Task name already exists"));
        }
        other => panic!("Expected CompileOnInvalidGraph, got {:?}", other),
    }
}

#[test]
fn test_compiler_refuses_invalid_metadata() {
    let (graph, ..) = create_linear_graph();
    let mut metadata = WorkflowMetadata::new("", "desc");
    metadata.global.insert(" ".to_string(), json!(1));

    match compile(&graph, &metadata) {
        Err(CompileError::InvalidMetadata { problems }) => {
            assert_eq!(problems, vec!["Name is required", "Global keys must not be empty"]);
        }
        other => panic!("Expected InvalidMetadata, got {:?}", other),
    }
}

#[test]
fn test_compiler_with_custom_validator() {
    let (mut graph, _, function, _) = create_linear_graph();
    graph.update_node(&function.id, NodePatch::new().label("S")).unwrap();
    let validator = Validator::empty();
    let metadata = create_metadata();

    let definition = Compiler::builder(&graph, &metadata)
        .with_validator(&validator)
        .build()
        .compile()
        .unwrap();
    assert_eq!(definition.tasks.len(), 3);
}

#[test]
fn test_compiler_carries_global_and_status() {
    let (graph, ..) = create_linear_graph();
    let mut metadata = create_metadata();
    metadata.status = WorkflowStatus::Inactive;
    metadata.global.insert("region".to_string(), json!("eu"));

    let definition = compile(&graph, &metadata).unwrap();
    assert_eq!(definition.status, WorkflowStatus::Inactive);
    assert_eq!(definition.global.get("region"), Some(&json!("eu")));
}

#[test]
fn test_compiled_definition_wire_format() {
    let (graph, _, function, _) = create_linear_graph();
    let definition = compile(&graph, &create_metadata()).unwrap();
    let value = serde_json::to_value(&definition).unwrap();

    assert_eq!(value["status"], json!("active"));
    let task = &value["tasks"][1];
    assert_eq!(task["id"], json!(function.id.as_str()));
    assert_eq!(task["type"], json!("FUNCTION"));
    assert_eq!(task["name"], json!("F"));
    assert!(task["execTs"].is_string());

    let end = value["tasks"][2].as_object().unwrap();
    assert!(!end.contains_key("exec"));
    assert!(!end.contains_key("execTs"));

    let parsed: WorkflowDefinition = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, definition);
}

#[test]
fn test_dangling_references_are_found() {
    let (graph, ..) = create_linear_graph();
    let mut definition = compile(&graph, &create_metadata()).unwrap();
    definition.tasks[0].next.push("Ghost".to_string());
    assert_eq!(definition.dangling_references(), vec!["Ghost"]);
}
