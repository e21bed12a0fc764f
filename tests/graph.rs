//! Tests for structural graph operations.
mod common;
use common::*;
use flowdraft::graph::PortSide;
use flowdraft::prelude::*;
use flowdraft::task::registry;
use serde_json::json;

#[test]
fn test_add_node_uses_registry_defaults() {
    let mut graph = Graph::new();
    let node = graph.add_node(TaskType::Wait);

    assert_eq!(node.params.get("taskNames"), Some(&json!([])));
    assert!(node.label.starts_with("Wait "));
    assert!(node.input_port().is_some());
    assert!(node.output_port().is_some());
    assert_eq!(node.position, Position { x: 100.0, y: 100.0 });
}

#[test]
fn test_port_layout_follows_task_type() {
    let mut graph = Graph::new();
    let start = add_task(&mut graph, TaskType::Start, "S");
    let end = add_task(&mut graph, TaskType::End, "E");
    let listen = add_task(&mut graph, TaskType::Listen, "L");

    assert!(start.input.is_none() && start.output.is_some());
    assert!(end.input.is_some() && end.output.is_none());
    assert!(listen.input.is_some() && listen.output.is_none());

    let binding = graph.port(start.output.as_ref().unwrap()).unwrap();
    assert_eq!(binding.node, start.id);
    assert_eq!(binding.side, PortSide::Output);
}

#[test]
fn test_scriptable_nodes_start_with_both_scripts() {
    let mut graph = Graph::new();
    let function = graph.add_node(TaskType::Function);
    assert!(function.exec.as_deref().unwrap().contains("async function handler()"));
    assert!(function.exec_ts.as_deref().unwrap().contains("Promise<Record<string, any>>"));

    let guard = graph.add_node(TaskType::Guard);
    assert!(guard.exec_ts.as_deref().unwrap().contains("Promise<boolean>"));
    assert!(!guard.exec.as_deref().unwrap().contains("Promise<boolean>"));
}

#[test]
fn test_generated_labels_differ() {
    let mut graph = Graph::new();
    let first = graph.add_node(TaskType::Function).label.clone();
    let second = graph.add_node(TaskType::Function).label.clone();
    assert_ne!(first, second);
}

#[test]
fn test_connect_fans_out_from_one_output() {
    let mut graph = Graph::new();
    let start = add_task(&mut graph, TaskType::Start, "S");
    let a = add_task(&mut graph, TaskType::Function, "A");
    let b = add_task(&mut graph, TaskType::Function, "B");

    link(&mut graph, &start, &a);
    link(&mut graph, &start, &b);

    let out = start.output.as_ref().unwrap();
    assert_eq!(graph.edges_from(out).count(), 2);
}

#[test]
fn test_connect_rejects_second_edge_into_input() {
    let mut graph = Graph::new();
    let a = add_task(&mut graph, TaskType::Start, "A");
    let b = add_task(&mut graph, TaskType::Function, "B");
    let c = add_task(&mut graph, TaskType::Function, "C");
    let existing = link(&mut graph, &a, &c);

    let result = graph.connect(b.output.as_ref().unwrap(), c.input.as_ref().unwrap());
    match result {
        Err(GraphError::PortAlreadyBound { port, existing: edge }) => {
            assert_eq!(&port, c.input.as_ref().unwrap());
            assert_eq!(edge, existing);
        }
        other => panic!("Expected PortAlreadyBound, got {:?}", other),
    }
    assert_eq!(graph.edges().len(), 1);
}

#[test]
fn test_connect_checks_port_sides() {
    let mut graph = Graph::new();
    let a = add_task(&mut graph, TaskType::Function, "A");
    let b = add_task(&mut graph, TaskType::Function, "B");

    let result = graph.connect(a.input.as_ref().unwrap(), b.input.as_ref().unwrap());
    assert!(matches!(
        result,
        Err(GraphError::WrongPortSide { expected: "output", actual: "input", .. })
    ));

    let result = graph.connect(&PortId::from("nowhere"), b.input.as_ref().unwrap());
    assert!(matches!(result, Err(GraphError::UnknownPort(_))));
    assert!(graph.edges().is_empty());
}

#[test]
fn test_connect_uses_editor_edge_ids() {
    let (graph, start, function, _) = create_linear_graph();
    let edge = graph.edge_into(function.input.as_ref().unwrap()).unwrap();
    let expected = format!(
        "reactflow__edge-{}{}-{}{}",
        start.id,
        start.output.as_ref().unwrap(),
        function.id,
        function.input.as_ref().unwrap()
    );
    assert_eq!(edge.id().as_str(), expected);
}

#[test]
fn test_remove_node_drops_attached_edges() {
    let (mut graph, _, function, _) = create_linear_graph();
    assert_eq!(graph.edges().len(), 2);

    let removed = graph.remove_node(&function.id).unwrap();
    assert_eq!(removed.label, "F");
    assert!(graph.edges().is_empty());
    assert_eq!(graph.len(), 2);
    assert!(graph.port(function.input.as_ref().unwrap()).is_none());

    let again = graph.remove_node(&function.id);
    assert_eq!(again.unwrap_err(), GraphError::UnknownNode(function.id.clone()));
}

#[test]
fn test_disconnect_frees_the_input_port() {
    let (mut graph, start, function, _) = create_linear_graph();
    let edge = graph.edge_into(function.input.as_ref().unwrap()).unwrap().id().clone();

    graph.disconnect(&edge).unwrap();
    assert!(graph.edge_into(function.input.as_ref().unwrap()).is_none());
    link(&mut graph, &start, &function);

    assert!(matches!(graph.disconnect(&EdgeId::from("missing")), Err(GraphError::UnknownEdge(_))));
}

#[test]
fn test_update_node_merges_params() {
    let mut graph = Graph::new();
    let node = add_task(&mut graph, TaskType::Function, "F");
    graph
        .update_node(&node.id, NodePatch::new().param("a", json!(1)).param("b", json!(2)))
        .unwrap();
    graph
        .update_node(&node.id, NodePatch::new().param("b", json!(3)).remove_param("a"))
        .unwrap();

    let node = graph.node(&node.id).unwrap();
    assert_eq!(node.label, "F");
    assert_eq!(node.params.get("a"), None);
    assert_eq!(node.params.get("b"), Some(&json!(3)));
    assert!(node.exec.is_some(), "Unmentioned fields are kept");
}

#[test]
fn test_update_unknown_node_fails() {
    let mut graph = Graph::new();
    let result = graph.update_node(&NodeId::from("ghost"), NodePatch::new().label("x"));
    assert!(matches!(result, Err(GraphError::UnknownNode(_))));
}

#[test]
fn test_touched_fields_name_the_changed_data() {
    let patch = NodePatch::new().label("x").remove_param("k").exec_ts("let a = 1;");
    assert_eq!(patch.touched_fields(), vec!["label", "params", "execTs"]);
    assert!(NodePatch::new().position(Position { x: 1.0, y: 2.0 }).touched_fields().is_empty());
}

#[test]
fn test_insert_node_rejects_duplicates() {
    let mut graph = Graph::new();
    let node = Node::restore(
        NodeId::from("n1"),
        TaskType::Function,
        Some(PortId::from("in")),
        Some(PortId::from("out")),
    );
    graph.insert_node(node.clone()).unwrap();
    assert!(matches!(graph.insert_node(node), Err(GraphError::DuplicateNode(_))));

    let clash = Node::restore(
        NodeId::from("n2"),
        TaskType::End,
        Some(PortId::from("out")),
        None,
    );
    assert!(matches!(graph.insert_node(clash), Err(GraphError::DuplicatePort(_))));
}

#[test]
fn test_restore_discards_ports_the_type_lacks() {
    let node = Node::restore(
        NodeId::from("s"),
        TaskType::Start,
        Some(PortId::from("in")),
        Some(PortId::from("out")),
    );
    assert!(node.input_port().is_none());
    assert_eq!(node.output_port(), Some(&PortId::from("out")));
}

#[test]
fn test_registry_table_follows_enum_order() {
    for (spec, task_type) in registry().specs().zip(TaskType::ALL) {
        assert_eq!(spec.task_type, task_type);
    }
}

#[test]
fn test_listen_defaults_are_fresh_per_call() {
    let spec = registry().spec(TaskType::Listen);
    let first = spec.defaults().params;
    let second = spec.defaults().params;
    assert!(first.get("apiKey").and_then(|v| v.as_str()).is_some());
    assert_ne!(first.get("apiKey"), second.get("apiKey"));
}

#[test]
fn test_task_type_parses_both_spellings() {
    assert_eq!("function".parse::<TaskType>(), Ok(TaskType::Function));
    assert_eq!("GUARD".parse::<TaskType>(), Ok(TaskType::Guard));
    assert_eq!("loop".parse::<TaskType>(), Err("loop".to_string()));
    assert_eq!(TaskType::Wait.ui_name(), "wait");
    assert_eq!(TaskType::Wait.to_string(), "WAIT");
}
