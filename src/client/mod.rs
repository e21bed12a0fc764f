//! External collaborators: definition storage, run inspection and run start.
//!
//! The traits are what the rest of the crate depends on. [`HttpClient`] implements
//! all of them against the workflow server's JSON API.

use crate::error::ClientError;
use crate::graph::Params;
use async_trait::async_trait;

mod http;
mod types;

pub use http::HttpClient;
pub use types::{
    DefinitionDraft, DefinitionSummary, EDITOR_KEY, LogLine, RunDefinitionRef, RunDetail,
    RunStatus, RunSummary, RunTask, StartRun, StoredDefinition, UiObject,
};

pub(crate) const TRACING_TARGET: &str = "flowdraft::client";

/// Supplies the bearer credential for every request.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// `None` means the user is not signed in. No request is sent in that case.
    async fn bearer_token(&self) -> Option<String>;
}

/// A fixed credential, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        self.0.clone().filter(|t| !t.trim().is_empty())
    }
}

/// Persists compiled definitions together with their editor snapshot.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    async fn create(&self, draft: &DefinitionDraft) -> Result<(), ClientError>;
    async fn update(&self, id: &str, draft: &DefinitionDraft) -> Result<(), ClientError>;
    async fn fetch(&self, id: &str) -> Result<StoredDefinition, ClientError>;
    async fn list(&self) -> Result<Vec<DefinitionSummary>, ClientError>;
}

/// Reads the state of started runs.
#[async_trait]
pub trait RuntimeInspector: Send + Sync {
    async fn fetch_run(&self, run_id: &str) -> Result<RunDetail, ClientError>;
}

/// Starts new runs of a stored definition.
#[async_trait]
pub trait RunLauncher: Send + Sync {
    /// `global_params` overrides the definition's global map for this run only.
    async fn start_run(&self, definition_id: &str, global_params: &Params) -> Result<(), ClientError>;
}
