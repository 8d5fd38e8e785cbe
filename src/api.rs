//! HTTP client for the back-office REST API.
//!
//! Only the endpoints the timeline needs are wrapped: the three list reads
//! and the task/milestone mutations. The request context (base URL, bearer
//! token, timeout) is handed in by the caller.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::models::{MilestoneDraft, TaskDraft};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Everything a request needs to reach the API on behalf of a user.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for RequestContext {
    fn default() -> Self {
        RequestContext {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Source of the three collections the timeline is built from.
///
/// Each method returns the raw list response; envelope handling is left to
/// [`crate::normalize::normalize_list`].
pub trait TimelineSource {
    fn list_tasks(&self) -> impl Future<Output = Result<Value>>;
    fn list_milestones(&self) -> impl Future<Output = Result<Value>>;
    fn list_properties(&self) -> impl Future<Output = Result<Value>>;
}

/// API client for the back office
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    context: RequestContext,
}

impl ApiClient {
    pub fn new(context: RequestContext) -> Result<Self> {
        let client = Client::builder()
            .timeout(context.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, context })
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.context.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.context.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and decodes the JSON body.
    ///
    /// Failures are reported as `"<operation> failed: <reason>"`, using the
    /// server's `message` field when the error body carries one.
    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Value> {
        let response = self
            .authorize(request)
            .send()
            .await
            .with_context(|| format!("{} failed: could not reach the API", operation))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    log::debug!("{}: could not read error body: {}", operation, e);
                    String::new()
                }
            };
            if status == StatusCode::UNAUTHORIZED {
                anyhow::bail!("{} failed: the session token was rejected (401)", operation);
            }
            anyhow::bail!("{} failed: {}", operation, error_reason(status, &body));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("{} failed: could not read the response", operation))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).with_context(|| format!("{} failed: response is not JSON", operation))
    }

    // ============================================
    // Tasks
    // ============================================

    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Value> {
        self.send("Create task", self.client.post(self.url("tasks")).json(draft)).await
    }

    pub async fn update_task(&self, id: &str, draft: &TaskDraft) -> Result<Value> {
        self.send("Update task", self.client.put(self.url(&format!("tasks/{}", id))).json(draft)).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<Value> {
        self.send("Delete task", self.client.delete(self.url(&format!("tasks/{}", id)))).await
    }

    pub async fn update_task_progress(&self, id: &str, progress: u8) -> Result<Value> {
        let body = serde_json::json!({ "progress": progress });
        self.send(
            "Update task progress",
            self.client.put(self.url(&format!("tasks/{}/progress", id))).json(&body),
        )
        .await
    }

    // ============================================
    // Milestones
    // ============================================

    pub async fn create_milestone(&self, draft: &MilestoneDraft) -> Result<Value> {
        self.send("Create milestone", self.client.post(self.url("milestones")).json(draft)).await
    }

    pub async fn update_milestone(&self, id: &str, draft: &MilestoneDraft) -> Result<Value> {
        self.send(
            "Update milestone",
            self.client.put(self.url(&format!("milestones/{}", id))).json(draft),
        )
        .await
    }

    pub async fn delete_milestone(&self, id: &str) -> Result<Value> {
        self.send("Delete milestone", self.client.delete(self.url(&format!("milestones/{}", id)))).await
    }

    pub async fn toggle_milestone(&self, id: &str) -> Result<Value> {
        self.send(
            "Toggle milestone",
            self.client.put(self.url(&format!("milestones/{}/toggle", id))),
        )
        .await
    }
}

impl TimelineSource for ApiClient {
    async fn list_tasks(&self) -> Result<Value> {
        self.send("List tasks", self.client.get(self.url("tasks"))).await
    }

    async fn list_milestones(&self) -> Result<Value> {
        self.send("List milestones", self.client.get(self.url("milestones"))).await
    }

    async fn list_properties(&self) -> Result<Value> {
        self.send("List properties", self.client.get(self.url("properties"))).await
    }
}

/// Picks the most useful explanation out of an error response.
pub fn error_reason(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                status.to_string()
            } else {
                format!("{} - {}", status, body)
            }
        })
}
