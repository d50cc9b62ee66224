use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProjectId, PromptId, TaskId};

/// Read-only projection returned by full-text search, most relevant first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub project_id: ProjectId,
    pub task_id: TaskId,
    pub prompt_id: PromptId,
    pub project_name: String,
    pub task_name: String,
    pub snippet: String,
    pub created_at: DateTime<Utc>,
}

impl SearchResult {
    pub fn breadcrumb(&self) -> String {
        format!("{} / {}", self.project_name, self.task_name)
    }
}
