use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use super::retry::RetryPolicy;
use crate::config::N8nConfig;
use crate::error::{OpsError, OpsResult};

pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
const LIST_TIMEOUT: Duration = Duration::from_secs(10);
const PUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin client for the n8n public REST API (`/api/v1`).
pub struct N8nClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

/// Outcome of listing the workflows already present in n8n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowListing {
    /// Workflow id by workflow name
    Found(HashMap<String, String>),
    /// The API rejected our key (or we sent none)
    Unauthorized,
    /// Anything else; importing continues as if nothing existed
    Unavailable(String),
}

/// Status and body of a create/update call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_accepted(&self) -> bool {
        matches!(self.status.as_u16(), 200 | 201)
    }

    /// `HTTP <status>: <first 100 chars of body>`
    pub fn failure_summary(&self) -> String {
        let snippet: String = self.body.chars().take(100).collect();
        format!("HTTP {}: {}", self.status.as_u16(), snippet)
    }
}

#[derive(Debug, Deserialize)]
struct WorkflowPage {
    #[serde(default)]
    data: Vec<WorkflowStub>,
}

#[derive(Debug, Deserialize)]
struct WorkflowStub {
    name: String,
    id: Value,
}

impl N8nClient {
    pub fn new(config: &N8nConfig) -> OpsResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("clinic-ops/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /healthz`; only a 200 counts as healthy.
    pub async fn health(&self) -> OpsResult<()> {
        let response = self
            .execute(Method::GET, "/healthz", None, HEALTH_TIMEOUT, false)
            .await
            .map_err(|e| OpsError::Unreachable(format!("n8n health check failed: {}", e)))?;

        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(OpsError::Unreachable(format!(
                "n8n health check returned {}",
                response.status().as_u16()
            )))
        }
    }

    pub async fn list_workflows(&self) -> WorkflowListing {
        let response = match self
            .execute(Method::GET, "/api/v1/workflows", None, LIST_TIMEOUT, true)
            .await
        {
            Ok(r) => r,
            Err(e) => return WorkflowListing::Unavailable(format!("Error fetching workflows: {}", e)),
        };

        match response.status() {
            StatusCode::OK => match response.json::<WorkflowPage>().await {
                Ok(page) => WorkflowListing::Found(
                    page.data
                        .into_iter()
                        .map(|wf| (wf.name, id_to_string(&wf.id)))
                        .collect(),
                ),
                Err(e) => WorkflowListing::Unavailable(format!("Error fetching workflows: {}", e)),
            },
            StatusCode::UNAUTHORIZED => WorkflowListing::Unauthorized,
            other => WorkflowListing::Unavailable(format!(
                "Could not fetch existing workflows: {}",
                other.as_u16()
            )),
        }
    }

    /// `POST /api/v1/workflows`
    pub async fn create_workflow(&self, workflow: &Value) -> OpsResult<ApiResponse> {
        let response = self
            .execute(Method::POST, "/api/v1/workflows", Some(workflow), PUSH_TIMEOUT, true)
            .await?;
        Self::collect(response).await
    }

    /// `PUT /api/v1/workflows/{id}`
    pub async fn update_workflow(&self, id: &str, workflow: &Value) -> OpsResult<ApiResponse> {
        let path = format!("/api/v1/workflows/{}", id);
        let response = self
            .execute(Method::PUT, &path, Some(workflow), PUSH_TIMEOUT, true)
            .await?;
        Self::collect(response).await
    }

    async fn collect(response: reqwest::Response) -> OpsResult<ApiResponse> {
        let status = response.status();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }

    /// Send a request, retrying per the policy.
    ///
    /// Once retries on a retryable status are exhausted the last response is
    /// returned as-is so the caller can report it.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        timeout: Duration,
        authenticated: bool,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let url = format!("{}{}", self.base_url, path);
        let mut retry = 0;

        loop {
            let mut request = self.http.request(method.clone(), &url).timeout(timeout);
            if authenticated {
                if let Some(key) = &self.api_key {
                    request = request.header(API_KEY_HEADER, key);
                }
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if retry < self.retry.total && self.retry.should_retry_status(&method, status) {
                        retry += 1;
                        let delay = self
                            .retry
                            .retry_after(status, response.headers())
                            .unwrap_or_else(|| self.retry.backoff(retry));
                        warn!(%method, %url, status, retry, total = self.retry.total, "retrying n8n request");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    debug!(%method, %url, status, "n8n request finished");
                    return Ok(response);
                }
                Err(err) if err.is_connect() && retry < self.retry.total => {
                    retry += 1;
                    warn!(%method, %url, retry, total = self.retry.total, error = %err, "connection failed, retrying");
                    tokio::time::sleep(self.retry.backoff(retry)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Workflow ids are strings in current n8n and integers in old exports.
fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
