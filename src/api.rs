//! HTTP API of the todo backend

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::error::BackendError;
use crate::models::{
    BulkDeleteRequest, BulkUpdateRequest, Task, TaskDraft, TaskId, TaskListPayload,
};
use crate::stats::TaskStats;

/// Read-only task lists served by dedicated endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskView {
    Overdue,
    DueToday,
}

impl TaskView {
    fn path(self) -> &'static str {
        match self {
            Self::Overdue => "/tasks/overdue/",
            Self::DueToday => "/tasks/due-today/",
        }
    }
}

/// Everything the sync controller needs from the backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /tasks/?<query>`
    async fn list_tasks(&self, query: &[(&'static str, String)]) -> Result<Vec<Task>, BackendError>;

    /// `GET /tasks/stats/`
    async fn stats(&self) -> Result<TaskStats, BackendError>;

    /// `GET /tasks/{id}/`
    async fn get_task(&self, id: &TaskId) -> Result<Task, BackendError>;

    /// `POST /tasks/`
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, BackendError>;

    /// `PUT /tasks/{id}/`
    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, BackendError>;

    /// `PATCH /tasks/{id}/toggle/`, no body
    async fn toggle_task(&self, id: &TaskId) -> Result<Task, BackendError>;

    /// `POST /tasks/{id}/complete/` or `/incomplete/`
    async fn set_completion(&self, id: &TaskId, done: bool) -> Result<Task, BackendError>;

    /// `DELETE /tasks/{id}/`
    async fn delete_task(&self, id: &TaskId) -> Result<(), BackendError>;

    /// `POST /tasks/bulk-delete/`
    async fn bulk_delete(&self, ids: &[TaskId]) -> Result<(), BackendError>;

    /// `POST /tasks/bulk-update/`
    async fn bulk_update(&self, ids: &[TaskId], is_done: bool) -> Result<(), BackendError>;

    /// One of the dedicated list endpoints
    async fn list_view(&self, view: TaskView) -> Result<Vec<Task>, BackendError>;
}

/// `Backend` over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    /// Backend at `base_url` (e.g. `http://localhost:8000/api`) with client defaults
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Sending request");

        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, BackendError> {
        let bytes = Self::send(builder).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    async fn send_list(builder: RequestBuilder) -> Result<Vec<Task>, BackendError> {
        Self::send_json::<TaskListPayload>(builder)
            .await
            .map(TaskListPayload::into_tasks)
    }

    async fn send_empty(builder: RequestBuilder) -> Result<(), BackendError> {
        Self::send(builder).await.map(drop)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_tasks(&self, query: &[(&'static str, String)]) -> Result<Vec<Task>, BackendError> {
        Self::send_list(self.request(Method::GET, "/tasks/").query(query)).await
    }

    async fn stats(&self) -> Result<TaskStats, BackendError> {
        Self::send_json(self.request(Method::GET, "/tasks/stats/")).await
    }

    async fn get_task(&self, id: &TaskId) -> Result<Task, BackendError> {
        Self::send_json(self.request(Method::GET, &format!("/tasks/{}/", id))).await
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, BackendError> {
        Self::send_json(self.request(Method::POST, "/tasks/").json(draft)).await
    }

    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, BackendError> {
        Self::send_json(
            self.request(Method::PUT, &format!("/tasks/{}/", id))
                .json(draft),
        )
        .await
    }

    async fn toggle_task(&self, id: &TaskId) -> Result<Task, BackendError> {
        Self::send_json(self.request(Method::PATCH, &format!("/tasks/{}/toggle/", id))).await
    }

    async fn set_completion(&self, id: &TaskId, done: bool) -> Result<Task, BackendError> {
        let action = if done { "complete" } else { "incomplete" };
        Self::send_json(self.request(Method::POST, &format!("/tasks/{}/{}/", id, action))).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), BackendError> {
        Self::send_empty(self.request(Method::DELETE, &format!("/tasks/{}/", id))).await
    }

    async fn bulk_delete(&self, ids: &[TaskId]) -> Result<(), BackendError> {
        let body = BulkDeleteRequest {
            task_ids: ids.to_vec(),
        };
        Self::send_empty(self.request(Method::POST, "/tasks/bulk-delete/").json(&body)).await
    }

    async fn bulk_update(&self, ids: &[TaskId], is_done: bool) -> Result<(), BackendError> {
        let body = BulkUpdateRequest {
            task_ids: ids.to_vec(),
            is_done,
        };
        Self::send_empty(self.request(Method::POST, "/tasks/bulk-update/").json(&body)).await
    }

    async fn list_view(&self, view: TaskView) -> Result<Vec<Task>, BackendError> {
        Self::send_list(self.request(Method::GET, view.path())).await
    }
}
