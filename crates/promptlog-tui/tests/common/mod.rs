#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use promptlog_core::{Bus, Notification, Notifier, Subscription};
use promptlog_tui::api::{
    CreatePromptRequest, CreateTaskRequest, GatewayResult, ListPromptsRequest, SearchRequest,
    UpdatePromptRequest, UpdateTaskRequest,
};
use promptlog_tui::{Confirmer, Controller, Gateway, GatewayError, Store};
use promptlog_types::{Project, ProjectId, PromptEntry, PromptId, SearchResult, Task, TaskId};

pub fn at(minutes: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn project(id: ProjectId, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
        created_at: at(id),
        updated_at: None,
    }
}

pub fn task(id: TaskId, project_id: ProjectId, name: &str) -> Task {
    Task {
        id,
        project_id,
        name: name.to_string(),
        description: None,
        created_at: at(id),
        updated_at: None,
    }
}

pub fn prompt(id: PromptId, task_id: TaskId, content: &str) -> PromptEntry {
    PromptEntry {
        id,
        task_id,
        title: None,
        content: content.to_string(),
        tags: None,
        model: None,
        created_at: at(id),
        updated_at: None,
    }
}

#[derive(Default)]
struct Backend {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    prompts: Vec<PromptEntry>,
    search_results: Vec<SearchResult>,
    next_id: i64,
    calls: Vec<String>,
    searches: Vec<String>,
    failing: HashSet<&'static str>,
}

/// In-memory backend that records every command it receives.
#[derive(Clone, Default)]
pub struct MockGateway {
    inner: Arc<Mutex<Backend>>,
}

impl MockGateway {
    pub fn new() -> Self {
        let gateway = Self::default();
        gateway.inner.lock().next_id = 1000;
        gateway
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.inner.lock().projects = projects;
        self
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        self.inner.lock().tasks = tasks;
        self
    }

    pub fn with_prompts(self, prompts: Vec<PromptEntry>) -> Self {
        self.inner.lock().prompts = prompts;
        self
    }

    pub fn with_search_results(self, results: Vec<SearchResult>) -> Self {
        self.inner.lock().search_results = results;
        self
    }

    /// Makes `command` fail with a backend error from now on.
    pub fn fail(&self, command: &'static str) {
        self.inner.lock().failing.insert(command);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    pub fn calls_to(&self, command: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.as_str() == command)
            .count()
    }

    pub fn searches(&self) -> Vec<String> {
        self.inner.lock().searches.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    fn enter(&self, command: &'static str) -> GatewayResult<parking_lot::MutexGuard<'_, Backend>> {
        let mut backend = self.inner.lock();
        backend.calls.push(command.to_string());
        if backend.failing.contains(command) {
            return Err(GatewayError::backend("DB_ERROR", format!("{command} rejected")));
        }
        Ok(backend)
    }
}

fn next_id(backend: &mut Backend) -> i64 {
    backend.next_id += 1;
    backend.next_id
}

#[async_trait]
impl Gateway for MockGateway {
    async fn list_projects(&self) -> GatewayResult<Vec<Project>> {
        Ok(self.enter("get_projects")?.projects.clone())
    }

    async fn create_project(&self, name: &str) -> GatewayResult<Project> {
        let mut backend = self.enter("create_project")?;
        let id = next_id(&mut backend);
        let project = project(id, name);
        backend.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: ProjectId, name: &str) -> GatewayResult<()> {
        let mut backend = self.enter("update_project")?;
        if let Some(p) = backend.projects.iter_mut().find(|p| p.id == id) {
            p.name = name.to_string();
        }
        Ok(())
    }

    async fn delete_project(&self, id: ProjectId) -> GatewayResult<()> {
        let mut backend = self.enter("delete_project")?;
        backend.projects.retain(|p| p.id != id);
        backend.tasks.retain(|t| t.project_id != id);
        Ok(())
    }

    async fn list_tasks(&self, project_id: ProjectId) -> GatewayResult<Vec<Task>> {
        let backend = self.enter("get_tasks")?;
        Ok(backend
            .tasks
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_task(&self, request: CreateTaskRequest) -> GatewayResult<Task> {
        let mut backend = self.enter("create_task")?;
        let id = next_id(&mut backend);
        let mut task = task(id, request.project_id, &request.name);
        task.description = request.description;
        backend.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, request: UpdateTaskRequest) -> GatewayResult<()> {
        let mut backend = self.enter("update_task")?;
        if let Some(t) = backend.tasks.iter_mut().find(|t| t.id == request.id) {
            if let Some(name) = request.name {
                t.name = name;
            }
        }
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> GatewayResult<()> {
        let mut backend = self.enter("delete_task")?;
        backend.tasks.retain(|t| t.id != id);
        backend.prompts.retain(|p| p.task_id != id);
        Ok(())
    }

    async fn list_prompt_entries(&self, request: ListPromptsRequest) -> GatewayResult<Vec<PromptEntry>> {
        let backend = self.enter("get_prompt_entries")?;
        Ok(backend
            .prompts
            .iter()
            .filter(|p| p.task_id == request.task_id)
            .cloned()
            .collect())
    }

    async fn create_prompt_entry(&self, request: CreatePromptRequest) -> GatewayResult<PromptEntry> {
        let mut backend = self.enter("create_prompt_entry")?;
        let id = next_id(&mut backend);
        let mut entry = prompt(id, request.task_id, &request.content);
        entry.title = request.title;
        backend.prompts.push(entry.clone());
        Ok(entry)
    }

    async fn update_prompt_entry(&self, request: UpdatePromptRequest) -> GatewayResult<()> {
        let mut backend = self.enter("update_prompt_entry")?;
        if let Some(p) = backend.prompts.iter_mut().find(|p| p.id == request.id) {
            if let Some(content) = request.content {
                p.content = content;
            }
            p.title = request.title;
        }
        Ok(())
    }

    async fn delete_prompt_entry(&self, id: PromptId) -> GatewayResult<()> {
        let mut backend = self.enter("delete_prompt_entry")?;
        backend.prompts.retain(|p| p.id != id);
        Ok(())
    }

    async fn search_prompt_entries(&self, request: SearchRequest) -> GatewayResult<Vec<SearchResult>> {
        let mut backend = self.enter("search_prompt_entries")?;
        backend.searches.push(request.keyword);
        Ok(backend.search_results.clone())
    }

    async fn get_database_path(&self) -> GatewayResult<String> {
        let _backend = self.enter("get_database_path")?;
        Ok("/data/promptlog.db".to_string())
    }

    async fn export_data(&self, _target_path: &str) -> GatewayResult<()> {
        let _backend = self.enter("export_data")?;
        Ok(())
    }

    async fn import_data(&self, _source_path: &str) -> GatewayResult<()> {
        let _backend = self.enter("import_data")?;
        Ok(())
    }
}

/// Answers confirmations from a queue, "no" once it runs dry, and records
/// every question asked.
#[derive(Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedConfirmer {
    pub fn answering(answers: &[bool]) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, message: &str) -> bool {
        self.asked.lock().push(message.to_string());
        self.answers.lock().pop_front().unwrap_or(false)
    }
}

/// Controller wired to a mock backend, plus a log of published notifications.
pub struct Harness {
    pub gateway: MockGateway,
    pub controller: Controller,
    pub confirmer: Arc<ScriptedConfirmer>,
    notifications: Arc<Mutex<Vec<Notification>>>,
    _subscription: Subscription,
}

impl Harness {
    pub fn new(gateway: MockGateway, answers: &[bool]) -> Self {
        let bus = Bus::new();
        let notifier = Notifier::new(bus);
        let notifications = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notifications);
        let subscription = notifier.on_notification(move |n| sink.lock().push(n));
        let confirmer = ScriptedConfirmer::answering(answers);
        let controller = Controller::new(
            Arc::new(gateway.clone()),
            Store::new(),
            notifier,
            confirmer.clone(),
        );
        Self {
            gateway,
            controller,
            confirmer,
            notifications,
            _subscription: subscription,
        }
    }

    pub fn store(&self) -> &Store {
        self.controller.store()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }
}
