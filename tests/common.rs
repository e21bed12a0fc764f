//! Common test utilities for building workflow graphs.
use flowdraft::prelude::*;
use serde_json::json;

/// Ids of one node added through [`add_task`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Handles {
    pub id: NodeId,
    pub input: Option<PortId>,
    pub output: Option<PortId>,
}

/// Adds a node of `task_type` and gives it `label`.
#[allow(dead_code)]
pub fn add_task(graph: &mut Graph, task_type: TaskType, label: &str) -> Handles {
    let node = graph.add_node(task_type);
    let handles = Handles {
        id: node.id().clone(),
        input: node.input_port().cloned(),
        output: node.output_port().cloned(),
    };
    graph
        .update_node(&handles.id, NodePatch::new().label(label))
        .expect("Failed to label node");
    handles
}

/// Connects `from`'s output port to `to`'s input port.
#[allow(dead_code)]
pub fn link(graph: &mut Graph, from: &Handles, to: &Handles) -> EdgeId {
    let source = from.output.as_ref().expect("Source has no output port");
    let target = to.input.as_ref().expect("Target has no input port");
    graph
        .connect(source, target)
        .expect("Failed to connect")
        .id()
        .clone()
}

/// The smallest valid workflow: `S -> F -> E`.
#[allow(dead_code)]
pub fn create_linear_graph() -> (Graph, Handles, Handles, Handles) {
    let mut graph = Graph::new();
    let start = add_task(&mut graph, TaskType::Start, "S");
    let function = add_task(&mut graph, TaskType::Function, "F");
    let end = add_task(&mut graph, TaskType::End, "E");
    link(&mut graph, &start, &function);
    link(&mut graph, &function, &end);
    (graph, start, function, end)
}

/// `S` fans out to `A` and `B`. `Join` follows `A` and waits on both by name.
#[allow(dead_code)]
pub fn create_fan_out_graph() -> Graph {
    let mut graph = Graph::new();
    let start = add_task(&mut graph, TaskType::Start, "S");
    let a = add_task(&mut graph, TaskType::Function, "A");
    let b = add_task(&mut graph, TaskType::Guard, "B");
    let wait = add_task(&mut graph, TaskType::Wait, "Join");
    let end = add_task(&mut graph, TaskType::End, "E");
    graph
        .update_node(&wait.id, NodePatch::new().param("taskNames", json!(["A", "B"])))
        .expect("Failed to set taskNames");
    link(&mut graph, &start, &a);
    link(&mut graph, &start, &b);
    link(&mut graph, &a, &wait);
    link(&mut graph, &wait, &end);
    graph
}

#[allow(dead_code)]
pub fn create_metadata() -> WorkflowMetadata {
    WorkflowMetadata::new("Orders", "Imports yesterday's orders")
}

/// An editor snapshot with a START and an END node joined by one edge.
#[allow(dead_code)]
pub fn create_snapshot_json() -> String {
    json!({
        "nodes": [
            {
                "id": "n-start",
                "type": "start",
                "position": { "x": 10.0, "y": 20.0 },
                "selected": true,
                "data": {
                    "label": "Begin",
                    "outputBoundId": "p-start-out",
                    "params": {},
                    "color": "green"
                }
            },
            {
                "id": "n-end",
                "type": "end",
                "position": { "x": 300.0, "y": 20.0 },
                "data": {
                    "label": "Finish",
                    "inputBoundId": "p-end-in",
                    "params": { "note": "done" }
                }
            }
        ],
        "edges": [
            {
                "id": "e-1",
                "source": "n-start",
                "sourceHandle": "p-start-out",
                "target": "n-end",
                "targetHandle": "p-end-in",
                "animated": true
            }
        ]
    })
    .to_string()
}

/// Collapses whitespace runs so transpiler output can be compared by content.
#[allow(dead_code)]
pub fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
