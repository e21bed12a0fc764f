use super::types::{DefinitionDraft, DefinitionSummary, Envelope, RunDetail, StartRun, StoredDefinition};
use super::{CredentialProvider, DefinitionStore, RunLauncher, RuntimeInspector, TRACING_TARGET};
use crate::config::Config;
use crate::error::ClientError;
use crate::graph::Params;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;

struct HttpClientInner {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

/// Reqwest-based client for the workflow server.
///
/// Every call asks the [`CredentialProvider`] for a token first and fails with
/// [`ClientError::Unauthorized`] without touching the network when there is none.
///
/// ```rust,no_run
/// use flowdraft::client::{DefinitionStore, HttpClient, StaticToken};
/// use flowdraft::config::Config;
/// use std::sync::Arc;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new(&Config::default(), Arc::new(StaticToken::new("token")))?;
/// for definition in client.list().await? {
///     println!("{} {}", definition.id, definition.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(
        config: &Config,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, ClientError> {
        let base_url = config.server_url.trim_end_matches('/').to_string();
        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %base_url,
            timeout_secs = config.request_timeout_secs,
            "Creating HTTP client"
        );

        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| ClientError::Request {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            inner: Arc::new(HttpClientInner {
                http,
                base_url,
                credentials,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    async fn request(&self, method: Method, path: &str) -> Result<(RequestBuilder, String), ClientError> {
        let token = self
            .inner
            .credentials
            .bearer_token()
            .await
            .ok_or(ClientError::Unauthorized)?;
        let url = format!("{}{}", self.inner.base_url, path);
        tracing::debug!(target: TRACING_TARGET, method = %method, url = %url, "Sending request");
        let builder = self.inner.http.request(method, &url).bearer_auth(token);
        Ok((builder, url))
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                target: TRACING_TARGET,
                url = %url,
                status = status.as_u16(),
                "Request failed"
            );
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ClientError> {
        let bytes = response.bytes().await.map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl DefinitionStore for HttpClient {
    async fn create(&self, draft: &DefinitionDraft) -> Result<(), ClientError> {
        let (builder, url) = self.request(Method::POST, "/definition/add-workflow").await?;
        self.send(builder.json(draft), &url).await?;
        tracing::info!(
            target: TRACING_TARGET,
            workflow = %draft.workflow.name,
            tasks = draft.workflow.tasks.len(),
            "Workflow definition created"
        );
        Ok(())
    }

    async fn update(&self, id: &str, draft: &DefinitionDraft) -> Result<(), ClientError> {
        let path = format!("/definition/edit/{}", id);
        let (builder, url) = self.request(Method::PUT, &path).await?;
        self.send(builder.json(draft), &url).await?;
        tracing::info!(
            target: TRACING_TARGET,
            definition_id = %id,
            tasks = draft.workflow.tasks.len(),
            "Workflow definition updated"
        );
        Ok(())
    }

    async fn fetch(&self, id: &str) -> Result<StoredDefinition, ClientError> {
        let path = format!("/definition/{}", id);
        let (builder, url) = self.request(Method::GET, &path).await?;
        let response = self.send(builder, &url).await?;
        Self::decode(response, &url).await
    }

    async fn list(&self) -> Result<Vec<DefinitionSummary>, ClientError> {
        let (builder, url) = self.request(Method::GET, "/definition").await?;
        let response = self.send(builder, &url).await?;
        Self::decode(response, &url).await
    }
}

#[async_trait]
impl RuntimeInspector for HttpClient {
    async fn fetch_run(&self, run_id: &str) -> Result<RunDetail, ClientError> {
        let path = format!("/runtime/{}", run_id);
        let (builder, url) = self.request(Method::GET, &path).await?;
        let response = self.send(builder, &url).await?;
        Self::decode(response, &url).await
    }
}

#[async_trait]
impl RunLauncher for HttpClient {
    async fn start_run(&self, definition_id: &str, global_params: &Params) -> Result<(), ClientError> {
        let body = StartRun {
            workflow_definition_id: definition_id,
            global_params,
        };
        let (builder, url) = self.request(Method::POST, "/workflow/start").await?;
        self.send(builder.json(&body), &url).await?;
        tracing::info!(
            target: TRACING_TARGET,
            definition_id = %definition_id,
            "Workflow run started"
        );
        Ok(())
    }
}
