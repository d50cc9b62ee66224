use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use promptlog_core::Notifier;
use promptlog_types::{
    Project, ProjectId, ProjectPatch, PromptEntry, PromptId, SearchResult, Task, TaskId, TaskPatch,
    EMPTY_CONTENT_PLACEHOLDER,
};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use crate::api::{
    CreatePromptRequest, CreateTaskRequest, Gateway, GatewayError, ListPromptsRequest,
    SearchRequest, UpdateTaskRequest,
};
use crate::context::edit::{EditState, NameDraft, PromptDraft};
use crate::context::store::{Action, Store};

pub const NEW_PROMPT_TITLE: &str = "New prompt";
pub const IMPORT_CONFIRMATION: &str = "Importing replaces ALL current data. Continue?";

/// Asks the user a yes/no question before a destructive call.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Confirms everything. Used by non-interactive callers that already asked.
pub struct AssumeYes;

#[async_trait]
impl Confirmer for AssumeYes {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Runs user intents against the backend and commits the results.
///
/// Nothing is written to the store before the backend accepted the change.
/// Failures are reported through the notifier and the log and leave the store
/// as it was; blank input aborts without a call.
#[derive(Clone)]
pub struct Controller {
    gateway: Arc<dyn Gateway>,
    store: Store,
    notifier: Notifier,
    confirmer: Arc<dyn Confirmer>,
    expanded: Arc<RwLock<HashSet<ProjectId>>>,
    search_limit: u32,
}

impl Controller {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        store: Store,
        notifier: Notifier,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            gateway,
            store,
            notifier,
            confirmer,
            expanded: Arc::new(RwLock::new(HashSet::new())),
            search_limit: promptlog_config::schema::DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = limit;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    fn report(&self, context: &str, err: &GatewayError) {
        tracing::error!(%err, "{}", context);
        self.notifier.error(format!("{context}: {err}"));
    }

    // ---- expansion ------------------------------------------------------

    pub fn is_expanded(&self, project_id: ProjectId) -> bool {
        self.expanded.read().contains(&project_id)
    }

    pub fn expanded_projects(&self) -> HashSet<ProjectId> {
        self.expanded.read().clone()
    }

    pub async fn toggle_project_expanded(&self, project_id: ProjectId) {
        let now_expanded = {
            let mut expanded = self.expanded.write();
            if !expanded.remove(&project_id) {
                expanded.insert(project_id);
                true
            } else {
                false
            }
        };
        if now_expanded {
            self.ensure_tasks_loaded(project_id).await;
        }
    }

    // ---- loading --------------------------------------------------------

    pub async fn load_projects(&self) -> bool {
        self.store.dispatch(Action::SetLoading(true));
        let result = self.gateway.list_projects().await;
        self.store.dispatch(Action::SetLoading(false));
        match result {
            Ok(projects) => {
                self.store.dispatch(Action::SetProjects(projects));
                true
            }
            Err(err) => {
                self.report("Failed to load projects", &err);
                false
            }
        }
    }

    pub async fn load_tasks(&self, project_id: ProjectId) -> bool {
        match self.gateway.list_tasks(project_id).await {
            Ok(tasks) => {
                self.store.dispatch(Action::SetTasks(project_id, tasks));
                true
            }
            Err(err) => {
                self.report("Failed to load tasks", &err);
                false
            }
        }
    }

    pub async fn load_prompts(&self, task_id: TaskId) -> bool {
        match self
            .gateway
            .list_prompt_entries(ListPromptsRequest::for_task(task_id))
            .await
        {
            Ok(prompts) => {
                self.store.dispatch(Action::SetPrompts(task_id, prompts));
                true
            }
            Err(err) => {
                self.report("Failed to load prompts", &err);
                false
            }
        }
    }

    pub async fn ensure_tasks_loaded(&self, project_id: ProjectId) -> bool {
        if self.store.read(|s| s.has_tasks_loaded(project_id)) {
            return true;
        }
        self.load_tasks(project_id).await
    }

    pub async fn ensure_prompts_loaded(&self, task_id: TaskId) -> bool {
        if self.store.read(|s| s.has_prompts_loaded(task_id)) {
            return true;
        }
        self.load_prompts(task_id).await
    }

    // ---- selection ------------------------------------------------------

    pub async fn select_project(&self, project_id: ProjectId) {
        self.store.dispatch(Action::SelectProject(Some(project_id)));
        self.expanded.write().insert(project_id);
        self.ensure_tasks_loaded(project_id).await;
    }

    /// Selects a task, moving the project selection along when the task
    /// belongs to a different project.
    pub async fn select_task(&self, task_id: TaskId) {
        let (owner, selected_project) = self
            .store
            .read(|s| (s.project_of_task(task_id), s.selection.project));
        if let Some(owner) = owner {
            if selected_project != Some(owner) {
                self.store.dispatch(Action::SelectProject(Some(owner)));
            }
        }
        self.store.dispatch(Action::SelectTask(Some(task_id)));
        self.ensure_prompts_loaded(task_id).await;
    }

    pub fn select_prompt(&self, prompt_id: Option<PromptId>) {
        self.store.dispatch(Action::SelectPrompt(prompt_id));
    }

    /// Walks the selection down to a search hit, loading each level that is
    /// not cached yet before selecting the next one.
    pub async fn focus_search_result(&self, result: &SearchResult) {
        self.store
            .dispatch(Action::SelectProject(Some(result.project_id)));
        self.expanded.write().insert(result.project_id);
        self.ensure_tasks_loaded(result.project_id).await;

        self.store.dispatch(Action::SelectTask(Some(result.task_id)));
        self.ensure_prompts_loaded(result.task_id).await;

        self.store
            .dispatch(Action::SelectPrompt(Some(result.prompt_id)));
        self.store.dispatch(Action::SetSearchOpen(false));
    }

    // ---- projects -------------------------------------------------------

    pub async fn create_project(&self, name: &str) -> Option<Project> {
        let name = NameDraft::new(name).validated()?;
        self.store.dispatch(Action::SetLoading(true));
        let result = self.gateway.create_project(&name).await;
        self.store.dispatch(Action::SetLoading(false));

        match result {
            Ok(project) => {
                self.store.dispatch(Action::AddProject(project.clone()));
                self.select_project(project.id).await;
                self.notifier.success("Project created");
                Some(project)
            }
            Err(err) => {
                self.report("Failed to create project", &err);
                None
            }
        }
    }

    pub async fn rename_project(&self, id: ProjectId, name: &str) -> bool {
        let Some(name) = NameDraft::new(name).validated() else {
            return false;
        };
        match self.gateway.update_project(id, &name).await {
            Ok(()) => {
                self.store.dispatch(Action::UpdateProject(
                    id,
                    ProjectPatch {
                        name: Some(name),
                        updated_at: Some(Utc::now()),
                    },
                ));
                self.notifier.success("Project updated");
                true
            }
            Err(err) => {
                self.report("Failed to update project", &err);
                false
            }
        }
    }

    pub async fn delete_project(&self, id: ProjectId) -> bool {
        if !self
            .confirmer
            .confirm("Delete this project? All of its tasks and prompts will be deleted too.")
            .await
        {
            return false;
        }
        match self.gateway.delete_project(id).await {
            Ok(()) => {
                self.store.dispatch(Action::RemoveProject(id));
                self.expanded.write().remove(&id);
                self.notifier.success("Project deleted");
                true
            }
            Err(err) => {
                self.report("Failed to delete project", &err);
                false
            }
        }
    }

    // ---- tasks ----------------------------------------------------------

    pub async fn create_task(
        &self,
        project_id: ProjectId,
        name: &str,
        description: Option<&str>,
    ) -> Option<Task> {
        let name = NameDraft::new(name).validated()?;
        let request = CreateTaskRequest {
            project_id,
            name,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };

        self.store.dispatch(Action::SetLoading(true));
        let result = self.gateway.create_task(request).await;
        self.store.dispatch(Action::SetLoading(false));

        match result {
            Ok(task) => {
                // A bucket that was never loaded is fetched whole instead of
                // being seeded with just the new task.
                if self.store.read(|s| s.has_tasks_loaded(project_id)) {
                    self.store.dispatch(Action::AddTask(task.clone()));
                } else {
                    self.load_tasks(project_id).await;
                }
                self.expanded.write().insert(project_id);
                if self.store.selection().project != Some(project_id) {
                    self.store.dispatch(Action::SelectProject(Some(project_id)));
                }
                self.store.dispatch(Action::SelectTask(Some(task.id)));
                self.ensure_prompts_loaded(task.id).await;
                self.notifier.success("Task created");
                Some(task)
            }
            Err(err) => {
                self.report("Failed to create task", &err);
                None
            }
        }
    }

    pub async fn rename_task(&self, id: TaskId, name: &str) -> bool {
        let Some(name) = NameDraft::new(name).validated() else {
            return false;
        };
        let request = UpdateTaskRequest {
            id,
            name: Some(name.clone()),
            description: None,
        };
        match self.gateway.update_task(request).await {
            Ok(()) => {
                self.store.dispatch(Action::UpdateTask(
                    id,
                    TaskPatch {
                        name: Some(name),
                        description: None,
                        updated_at: Some(Utc::now()),
                    },
                ));
                self.notifier.success("Task updated");
                true
            }
            Err(err) => {
                self.report("Failed to update task", &err);
                false
            }
        }
    }

    pub async fn delete_task(&self, id: TaskId) -> bool {
        if !self
            .confirmer
            .confirm("Delete this task? All of its prompts will be deleted too.")
            .await
        {
            return false;
        }
        match self.gateway.delete_task(id).await {
            Ok(()) => {
                self.store.dispatch(Action::RemoveTask(id));
                self.notifier.success("Task deleted");
                true
            }
            Err(err) => {
                self.report("Failed to delete task", &err);
                false
            }
        }
    }

    // ---- prompts --------------------------------------------------------

    pub async fn create_prompt(&self, task_id: TaskId) -> Option<PromptEntry> {
        let request = CreatePromptRequest {
            task_id,
            title: Some(NEW_PROMPT_TITLE.to_string()),
            content: EMPTY_CONTENT_PLACEHOLDER.to_string(),
            tags: None,
            model: None,
        };
        match self.gateway.create_prompt_entry(request).await {
            Ok(entry) => {
                if self.store.read(|s| s.has_prompts_loaded(task_id)) {
                    self.store.dispatch(Action::AddPrompt(entry.clone()));
                } else {
                    self.load_prompts(task_id).await;
                }
                self.store.dispatch(Action::SelectPrompt(Some(entry.id)));
                Some(entry)
            }
            Err(err) => {
                self.report("Failed to create prompt", &err);
                None
            }
        }
    }

    /// Saves silently; only failures are reported.
    pub async fn save_prompt(&self, id: PromptId, draft: &PromptDraft) -> bool {
        let request = draft.to_update(id);
        match self.gateway.update_prompt_entry(request).await {
            Ok(()) => {
                self.store
                    .dispatch(Action::UpdatePrompt(id, draft.to_patch(Utc::now())));
                true
            }
            Err(err) => {
                self.report("Failed to save prompt", &err);
                false
            }
        }
    }

    /// Leaves prompt edit mode. Returns the save job for the open draft, or
    /// `None` when nothing was being edited.
    pub fn blur_prompt_edit(
        &self,
        edit: &mut EditState<PromptDraft>,
    ) -> Option<impl Future<Output = bool> + Send + 'static> {
        let (id, draft) = edit.commit()?;
        let controller = self.clone();
        Some(async move { controller.save_prompt(id, &draft).await })
    }

    pub async fn delete_prompt(&self, id: PromptId) -> bool {
        if !self.confirmer.confirm("Delete this prompt?").await {
            return false;
        }
        match self.gateway.delete_prompt_entry(id).await {
            Ok(()) => {
                self.store.dispatch(Action::RemovePrompt(id));
                self.notifier.success("Prompt deleted");
                true
            }
            Err(err) => {
                self.report("Failed to delete prompt", &err);
                false
            }
        }
    }

    // ---- search ---------------------------------------------------------

    pub async fn search(&self, keyword: &str) -> Result<Vec<SearchResult>, GatewayError> {
        self.gateway
            .search_prompt_entries(SearchRequest {
                keyword: keyword.to_string(),
                project_id: None,
                task_id: None,
                limit: Some(self.search_limit),
            })
            .await
    }

    // ---- backup ---------------------------------------------------------

    pub async fn database_path(&self) -> Option<String> {
        match self.gateway.get_database_path().await {
            Ok(path) => Some(path),
            Err(err) => {
                self.report("Failed to read database path", &err);
                None
            }
        }
    }

    pub async fn export_data(&self, target_path: &str) -> bool {
        let target_path = target_path.trim();
        if target_path.is_empty() {
            return false;
        }
        match self.gateway.export_data(target_path).await {
            Ok(()) => {
                self.notifier
                    .success(format!("Exported to {target_path}"));
                true
            }
            Err(err) => {
                self.report("Export failed", &err);
                false
            }
        }
    }

    /// Replaces all backend data, then rebuilds the cache from scratch.
    pub async fn import_data(&self, source_path: &str) -> bool {
        let source_path = source_path.trim();
        if source_path.is_empty() {
            return false;
        }
        if !self
            .confirmer
            .confirm(IMPORT_CONFIRMATION)
            .await
        {
            return false;
        }
        match self.gateway.import_data(source_path).await {
            Ok(()) => {
                self.store.dispatch(Action::Reset);
                self.expanded.write().clear();
                self.notifier.success("Import finished");
                self.load_projects().await;
                true
            }
            Err(err) => {
                self.report("Import failed", &err);
                false
            }
        }
    }
}

/// Default file name offered by the export dialog.
pub fn default_export_file_name(today: chrono::NaiveDate) -> String {
    format!("promptlog_backup_{}.json", today.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_export_file_name() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 7, 3).unwrap();
        assert_eq!(default_export_file_name(day), "promptlog_backup_2024-07-03.json");
    }
}
