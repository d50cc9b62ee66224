use async_trait::async_trait;
use promptlog_types::{Project, ProjectId, PromptEntry, PromptId, SearchResult, Task, TaskId};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("cannot reach backend: {0}")]
    Transport(String),
    #[error("{message}")]
    Backend { code: String, message: String },
    #[error("unexpected response for `{command}`: {message}")]
    Decode { command: String, message: String },
}

impl GatewayError {
    pub fn backend(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error object the backend returns with a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub project_id: ProjectId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPromptsRequest {
    pub task_id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ListPromptsRequest {
    pub fn for_task(task_id: TaskId) -> Self {
        Self {
            task_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromptRequest {
    pub task_id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromptRequest {
    pub id: PromptId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Remote commands exposed by the PromptLog backend.
///
/// Every call either yields its payload or a [`GatewayError`]; nothing is
/// retried and nothing is cached here.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_projects(&self) -> GatewayResult<Vec<Project>>;
    async fn create_project(&self, name: &str) -> GatewayResult<Project>;
    async fn update_project(&self, id: ProjectId, name: &str) -> GatewayResult<()>;
    async fn delete_project(&self, id: ProjectId) -> GatewayResult<()>;

    async fn list_tasks(&self, project_id: ProjectId) -> GatewayResult<Vec<Task>>;
    async fn create_task(&self, request: CreateTaskRequest) -> GatewayResult<Task>;
    async fn update_task(&self, request: UpdateTaskRequest) -> GatewayResult<()>;
    async fn delete_task(&self, id: TaskId) -> GatewayResult<()>;

    async fn list_prompt_entries(&self, request: ListPromptsRequest) -> GatewayResult<Vec<PromptEntry>>;
    async fn create_prompt_entry(&self, request: CreatePromptRequest) -> GatewayResult<PromptEntry>;
    async fn update_prompt_entry(&self, request: UpdatePromptRequest) -> GatewayResult<()>;
    async fn delete_prompt_entry(&self, id: PromptId) -> GatewayResult<()>;

    async fn search_prompt_entries(&self, request: SearchRequest) -> GatewayResult<Vec<SearchResult>>;

    async fn get_database_path(&self) -> GatewayResult<String>;
    async fn export_data(&self, target_path: &str) -> GatewayResult<()>;
    async fn import_data(&self, source_path: &str) -> GatewayResult<()>;
}

/// HTTP bridge: `POST {base_url}/invoke/{command}` with a JSON argument
/// object, answered by the JSON payload or a `{code, message}` error.
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> GatewayResult<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn invoke<A, T>(&self, command: &str, args: &A) -> GatewayResult<T>
    where
        A: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}/invoke/{}", self.base_url, command);
        tracing::info!(command, "invoking backend command");

        let response = self.client.post(&url).json(args).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = decode_error(status.as_u16(), &body);
            tracing::error!(command, %status, %err, "backend command failed");
            return Err(err);
        }

        decode_payload(command, &body)
    }
}

pub(crate) fn decode_error(status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<BackendErrorBody>(body) {
        Ok(err) => GatewayError::Backend {
            code: err.code,
            message: err.message,
        },
        Err(_) if body.trim().is_empty() => {
            GatewayError::backend(status.to_string(), format!("request failed with status {status}"))
        }
        Err(_) => GatewayError::backend(status.to_string(), body.trim().to_string()),
    }
}

pub(crate) fn decode_payload<T: DeserializeOwned>(command: &str, body: &str) -> GatewayResult<T> {
    // Unit results arrive as `null` or an empty body.
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|err| GatewayError::Decode {
        command: command.to_string(),
        message: err.to_string(),
    })
}

#[derive(Serialize)]
struct NoArgs {}

#[derive(Serialize)]
struct IdArgs {
    id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectArgs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<ProjectId>,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectIdArgs {
    project_id: ProjectId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetPathArgs<'a> {
    target_path: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourcePathArgs<'a> {
    source_path: &'a str,
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list_projects(&self) -> GatewayResult<Vec<Project>> {
        self.invoke("list_projects", &NoArgs {}).await
    }

    async fn create_project(&self, name: &str) -> GatewayResult<Project> {
        self.invoke("create_project", &ProjectArgs { id: None, name })
            .await
    }

    async fn update_project(&self, id: ProjectId, name: &str) -> GatewayResult<()> {
        self.invoke("update_project", &ProjectArgs { id: Some(id), name })
            .await
    }

    async fn delete_project(&self, id: ProjectId) -> GatewayResult<()> {
        self.invoke("delete_project", &IdArgs { id }).await
    }

    async fn list_tasks(&self, project_id: ProjectId) -> GatewayResult<Vec<Task>> {
        self.invoke("list_tasks", &ProjectIdArgs { project_id }).await
    }

    async fn create_task(&self, request: CreateTaskRequest) -> GatewayResult<Task> {
        self.invoke("create_task", &request).await
    }

    async fn update_task(&self, request: UpdateTaskRequest) -> GatewayResult<()> {
        self.invoke("update_task", &request).await
    }

    async fn delete_task(&self, id: TaskId) -> GatewayResult<()> {
        self.invoke("delete_task", &IdArgs { id }).await
    }

    async fn list_prompt_entries(&self, request: ListPromptsRequest) -> GatewayResult<Vec<PromptEntry>> {
        self.invoke("list_prompt_entries", &request).await
    }

    async fn create_prompt_entry(&self, request: CreatePromptRequest) -> GatewayResult<PromptEntry> {
        self.invoke("create_prompt_entry", &request).await
    }

    async fn update_prompt_entry(&self, request: UpdatePromptRequest) -> GatewayResult<()> {
        self.invoke("update_prompt_entry", &request).await
    }

    async fn delete_prompt_entry(&self, id: PromptId) -> GatewayResult<()> {
        self.invoke("delete_prompt_entry", &IdArgs { id }).await
    }

    async fn search_prompt_entries(&self, request: SearchRequest) -> GatewayResult<Vec<SearchResult>> {
        self.invoke("search_prompt_entries", &request).await
    }

    async fn get_database_path(&self) -> GatewayResult<String> {
        self.invoke("get_database_path", &NoArgs {}).await
    }

    async fn export_data(&self, target_path: &str) -> GatewayResult<()> {
        self.invoke("export_data", &TargetPathArgs { target_path })
            .await
    }

    async fn import_data(&self, source_path: &str) -> GatewayResult<()> {
        self.invoke("import_data", &SourcePathArgs { source_path })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requests_use_camel_case_and_omit_absent_fields() {
        let request = ListPromptsRequest {
            task_id: 4,
            tags: Some(vec!["x".into()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "taskId": 4, "tags": ["x"] })
        );

        let search = SearchRequest {
            keyword: "foo".into(),
            project_id: Some(1),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&search).unwrap(),
            json!({ "keyword": "foo", "projectId": 1, "limit": 20 })
        );

        assert_eq!(
            serde_json::to_value(TargetPathArgs { target_path: "/tmp/a.json" }).unwrap(),
            json!({ "targetPath": "/tmp/a.json" })
        );
    }

    #[test]
    fn test_decode_error_prefers_backend_shape() {
        let err = decode_error(404, r#"{"code":"NOT_FOUND","message":"Task 9 not found"}"#);
        match &err {
            GatewayError::Backend { code, message } => {
                assert_eq!(code, "NOT_FOUND");
                assert_eq!(message, "Task 9 not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "Task 9 not found");

        let raw = decode_error(500, "database is locked\n");
        assert_eq!(raw.to_string(), "database is locked");

        let empty = decode_error(502, "");
        assert_eq!(empty.to_string(), "request failed with status 502");
    }

    #[test]
    fn test_decode_payload_handles_unit_and_garbage() {
        let unit: () = decode_payload("delete_task", "null").unwrap();
        assert_eq!(unit, ());
        let empty: () = decode_payload("delete_task", "").unwrap();
        assert_eq!(empty, ());

        let err = decode_payload::<Vec<Project>>("list_projects", "{oops").unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }
}
