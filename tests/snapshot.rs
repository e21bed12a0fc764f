//! Tests for restoring graphs from editor snapshots and capturing them again.
mod common;
use common::*;
use flowdraft::prelude::*;
use serde_json::{Value, json};

#[test]
fn test_snapshot_restores_nodes_and_edges() {
    let graph = UiSnapshot::from_json(&create_snapshot_json())
        .unwrap()
        .into_graph()
        .expect("Failed to restore graph");

    assert_eq!(graph.len(), 2);
    let start = graph.node(&NodeId::from("n-start")).unwrap();
    assert_eq!(start.task_type(), TaskType::Start);
    assert_eq!(start.label, "Begin");
    assert_eq!(start.position, Position { x: 10.0, y: 20.0 });
    assert_eq!(start.output_port(), Some(&PortId::from("p-start-out")));
    assert_eq!(start.ui_extra.get("selected"), Some(&json!(true)));
    assert_eq!(start.data_extra.get("color"), Some(&json!("green")));

    let edge = graph.edge_into(&PortId::from("p-end-in")).unwrap();
    assert_eq!(edge.id().as_str(), "e-1");
    assert_eq!(edge.source().as_str(), "n-start");
    assert_eq!(edge.ui_extra.get("animated"), Some(&json!(true)));
}

#[test]
fn test_snapshot_round_trip_keeps_editor_attributes() {
    let original: Value = serde_json::from_str(&create_snapshot_json()).unwrap();
    let graph = UiSnapshot::from_json(&create_snapshot_json())
        .unwrap()
        .into_graph()
        .unwrap();

    let captured = serde_json::to_value(UiSnapshot::from_graph(&graph)).unwrap();
    assert_eq!(captured, original);
}

#[test]
fn test_built_graph_survives_round_trip() {
    let (graph, _, function, _) = create_linear_graph();
    let json = serde_json::to_string(&UiSnapshot::from_graph(&graph)).unwrap();
    let restored = UiSnapshot::from_json(&json).unwrap().into_graph().unwrap();

    assert_eq!(restored.nodes(), graph.nodes());
    assert_eq!(restored.edges(), graph.edges());
    let metadata = create_metadata();
    assert_eq!(
        compile(&restored, &metadata).unwrap(),
        compile(&graph, &metadata).unwrap()
    );
    assert_eq!(
        restored.node(&function.id).unwrap().exec_ts,
        graph.node(&function.id).unwrap().exec_ts
    );
}

#[test]
fn test_snapshot_uses_lowercase_types_and_bound_ids() {
    let (graph, start, ..) = create_linear_graph();
    let value = serde_json::to_value(UiSnapshot::from_graph(&graph)).unwrap();
    let node = &value["nodes"][0];
    assert_eq!(node["type"], json!("start"));
    assert_eq!(node["data"]["outputBoundId"], json!(start.output.unwrap().as_str()));
    assert!(node["data"].get("inputBoundId").is_none());
}

#[test]
fn test_unknown_task_type_is_rejected() {
    let json = json!({
        "nodes": [{ "id": "x", "type": "loop", "data": { "label": "L" } }],
        "edges": []
    });
    match UiSnapshot::from_json(&json.to_string()).unwrap().into_graph() {
        Err(SnapshotError::UnknownTaskType { node_id, type_name }) => {
            assert_eq!(node_id, "x");
            assert_eq!(type_name, "loop");
        }
        other => panic!("Expected UnknownTaskType, got {:?}", other),
    }
}

#[test]
fn test_missing_bound_id_is_rejected() {
    let json = json!({
        "nodes": [{ "id": "f", "type": "function", "data": { "label": "F", "inputBoundId": "in" } }]
    });
    let result = UiSnapshot::from_json(&json.to_string()).unwrap().into_graph();
    assert!(matches!(
        result,
        Err(SnapshotError::MissingPort { side: "output", task_type: "FUNCTION", .. })
    ));
}

#[test]
fn test_edge_to_unknown_port_is_rejected() {
    let mut json: Value = serde_json::from_str(&create_snapshot_json()).unwrap();
    json["edges"][0]["targetHandle"] = json!("nowhere");
    let result = UiSnapshot::from_json(&json.to_string()).unwrap().into_graph();
    assert!(matches!(
        result,
        Err(SnapshotError::Structure(GraphError::UnknownPort(_)))
    ));
}

#[test]
fn test_edge_without_id_gets_editor_id() {
    let mut json: Value = serde_json::from_str(&create_snapshot_json()).unwrap();
    json["edges"][0].as_object_mut().unwrap().remove("id");
    let graph = UiSnapshot::from_json(&json.to_string()).unwrap().into_graph().unwrap();
    assert_eq!(
        graph.edges()[0].id().as_str(),
        "reactflow__edge-n-startp-start-out-n-endp-end-in"
    );
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    assert!(matches!(
        UiSnapshot::from_json("{ nodes: "),
        Err(SnapshotError::JsonParseError(_))
    ));
}
