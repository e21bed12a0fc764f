use crate::graph::{EdgeId, NodeId, PortId};
use crate::validator::Violation;
use thiserror::Error;

/// Errors raised by structural graph mutations.
///
/// A failing operation never applies a partial mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node '{0}' does not exist in this graph")]
    UnknownNode(NodeId),

    #[error("Port '{0}' is not bound to any node in this graph")]
    UnknownPort(PortId),

    #[error("Port '{port}' is an {actual} port, but an {expected} port is required")]
    WrongPortSide {
        port: PortId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Input port '{port}' is already the target of edge '{existing}'")]
    PortAlreadyBound { port: PortId, existing: EdgeId },

    #[error("Edge '{0}' does not exist in this graph")]
    UnknownEdge(EdgeId),

    #[error("Port '{0}' is declared by more than one node")]
    DuplicatePort(PortId),

    #[error("Edge id '{0}' is used by more than one edge")]
    DuplicateEdge(EdgeId),

    #[error("Node id '{0}' is used by more than one node")]
    DuplicateNode(NodeId),
}

/// Errors that can occur during the compilation phase.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("Refusing to compile a graph with {} validation violation(s)", violations.len())]
    CompileOnInvalidGraph { violations: Vec<Violation> },

    #[error("Workflow metadata is invalid: {}", problems.join("; "))]
    InvalidMetadata { problems: Vec<String> },
}

/// Errors produced while turning authored script text into an executable form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unable to transpile current code: {message} (line {line}, column {column})")]
    Transpile {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Node '{0}' does not carry a script")]
    NotScriptable(NodeId),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised while parsing a user-typed JSON map (params, global map, run overrides).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JsonInputError {
    #[error("Error parsing JSON: {0}")]
    Parse(String),

    #[error("Expected a JSON object")]
    NotAnObject,

    #[error("No empty keys")]
    EmptyKey,
}

/// Errors that can occur when converting a UI snapshot into a graph.
#[derive(Error, Debug, Clone)]
pub enum SnapshotError {
    #[error("Failed to parse snapshot JSON: {0}")]
    JsonParseError(String),

    #[error("Node '{node_id}' has an unknown task type: '{type_name}'")]
    UnknownTaskType { node_id: String, type_name: String },

    #[error("Node '{node_id}' of type {task_type} is missing its {side} bound id")]
    MissingPort {
        node_id: String,
        task_type: &'static str,
        side: &'static str,
    },

    #[error("Snapshot is structurally invalid: {0}")]
    Structure(#[from] GraphError),
}

/// Errors raised by the external collaborators (storage, runtime, run start).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unauthorized: no bearer credential is available")]
    Unauthorized,

    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server answered '{url}' with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from '{url}': {message}")]
    Decode { url: String, message: String },
}

/// Errors raised when a session submits its draft.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("A submission for this session is already in flight")]
    InFlight,

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Environment variable '{name}' has an invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}
