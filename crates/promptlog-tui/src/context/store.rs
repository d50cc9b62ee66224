use parking_lot::{Mutex, RwLock};
use promptlog_types::{
    Project, ProjectId, ProjectPatch, PromptEntry, PromptId, PromptPatch, Task, TaskId, TaskPatch,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub project: Option<ProjectId>,
    pub task: Option<TaskId>,
    pub prompt: Option<PromptId>,
}

/// Normalized cache of everything the client has loaded.
///
/// Buckets are keyed by parent id. A missing bucket means "never loaded",
/// an empty one means "loaded, no children".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub projects: Vec<Project>,
    pub tasks_by_project: HashMap<ProjectId, Vec<Task>>,
    pub prompts_by_task: HashMap<TaskId, Vec<PromptEntry>>,
    pub selection: Selection,
    pub settings_open: bool,
    pub search_open: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetProjects(Vec<Project>),
    AddProject(Project),
    UpdateProject(ProjectId, ProjectPatch),
    RemoveProject(ProjectId),

    SetTasks(ProjectId, Vec<Task>),
    AddTask(Task),
    UpdateTask(TaskId, TaskPatch),
    RemoveTask(TaskId),

    SetPrompts(TaskId, Vec<PromptEntry>),
    AddPrompt(PromptEntry),
    UpdatePrompt(PromptId, PromptPatch),
    RemovePrompt(PromptId),

    SelectProject(Option<ProjectId>),
    SelectTask(Option<TaskId>),
    SelectPrompt(Option<PromptId>),

    SetSettingsOpen(bool),
    SetSearchOpen(bool),
    SetLoading(bool),

    Reset,
}

impl AppState {
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn has_project(&self, id: ProjectId) -> bool {
        self.project(id).is_some()
    }

    pub fn tasks_for(&self, project_id: ProjectId) -> &[Task] {
        self.tasks_by_project
            .get(&project_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn prompts_for(&self, task_id: TaskId) -> &[PromptEntry] {
        self.prompts_by_task
            .get(&task_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_tasks_loaded(&self, project_id: ProjectId) -> bool {
        self.tasks_by_project.contains_key(&project_id)
    }

    pub fn has_prompts_loaded(&self, task_id: TaskId) -> bool {
        self.prompts_by_task.contains_key(&task_id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks_by_project
            .values()
            .flatten()
            .find(|t| t.id == id)
    }

    pub fn prompt(&self, id: PromptId) -> Option<&PromptEntry> {
        self.prompts_by_task
            .values()
            .flatten()
            .find(|p| p.id == id)
    }

    pub fn project_of_task(&self, task_id: TaskId) -> Option<ProjectId> {
        self.task(task_id).map(|t| t.project_id)
    }

    /// A task id is known when it sits in some loaded project bucket.
    fn knows_task(&self, task_id: TaskId) -> bool {
        self.task(task_id).is_some()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.selection.project.and_then(|id| self.project(id))
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selection.task.and_then(|id| self.task(id))
    }

    pub fn selected_prompt(&self) -> Option<&PromptEntry> {
        self.selection.prompt.and_then(|id| self.prompt(id))
    }
}

fn dedup_by_id<T, F>(items: Vec<T>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> i64,
{
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        let id = id_of(&item);
        match out.iter_mut().find(|existing| id_of(existing) == id) {
            Some(slot) => *slot = item,
            None => out.push(item),
        }
    }
    out
}

fn upsert<T, F>(items: &mut Vec<T>, item: T, id_of: F)
where
    F: Fn(&T) -> i64,
{
    let id = id_of(&item);
    match items.iter_mut().find(|existing| id_of(existing) == id) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

fn drop_task_subtree(state: &mut AppState, task_id: TaskId) {
    if let Some(prompts) = state.prompts_by_task.remove(&task_id) {
        if let Some(selected) = state.selection.prompt {
            if prompts.iter().any(|p| p.id == selected) {
                state.selection.prompt = None;
            }
        }
    }
    if state.selection.task == Some(task_id) {
        state.selection.task = None;
        state.selection.prompt = None;
    }
}

/// Pure state transition. Unknown ids are no-ops; nothing here panics.
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::SetProjects(projects) => {
            state.projects = dedup_by_id(projects, |p| p.id);
            // Buckets and selection of projects that no longer exist are dropped,
            // whether or not their tasks were ever loaded.
            let live: Vec<ProjectId> = state.projects.iter().map(|p| p.id).collect();
            let mut stale: Vec<ProjectId> = state
                .tasks_by_project
                .keys()
                .copied()
                .chain(state.selection.project)
                .filter(|id| !live.contains(id))
                .collect();
            stale.sort_unstable();
            stale.dedup();
            for project_id in stale {
                state = reduce(state, Action::RemoveProject(project_id));
            }
        }
        Action::AddProject(project) => upsert(&mut state.projects, project, |p| p.id),
        Action::UpdateProject(id, patch) => {
            if let Some(project) = state.projects.iter_mut().find(|p| p.id == id) {
                project.apply(&patch);
            }
        }
        Action::RemoveProject(id) => {
            state.projects.retain(|p| p.id != id);
            if let Some(tasks) = state.tasks_by_project.remove(&id) {
                for task in tasks {
                    drop_task_subtree(&mut state, task.id);
                }
            }
            if state.selection.project == Some(id) {
                state.selection = Selection::default();
            }
        }

        Action::SetTasks(project_id, tasks) => {
            if !state.has_project(project_id) {
                tracing::debug!(project_id, "dropping task list for unknown project");
                return state;
            }
            let tasks = dedup_by_id(
                tasks.into_iter().filter(|t| t.project_id == project_id).collect(),
                |t| t.id,
            );
            let previous = state.tasks_by_project.insert(project_id, tasks);
            for old in previous.into_iter().flatten() {
                if !state.tasks_for(project_id).iter().any(|t| t.id == old.id) {
                    drop_task_subtree(&mut state, old.id);
                }
            }
        }
        Action::AddTask(task) => {
            if !state.has_project(task.project_id) {
                tracing::debug!(task_id = task.id, "dropping task for unknown project");
                return state;
            }
            let bucket = state.tasks_by_project.entry(task.project_id).or_default();
            upsert(bucket, task, |t| t.id);
        }
        Action::UpdateTask(id, patch) => {
            if let Some(task) = state
                .tasks_by_project
                .values_mut()
                .flatten()
                .find(|t| t.id == id)
            {
                task.apply(&patch);
            }
        }
        Action::RemoveTask(id) => {
            let mut found = false;
            for tasks in state.tasks_by_project.values_mut() {
                let before = tasks.len();
                tasks.retain(|t| t.id != id);
                found |= tasks.len() != before;
            }
            if found || state.prompts_by_task.contains_key(&id) || state.selection.task == Some(id)
            {
                drop_task_subtree(&mut state, id);
            }
        }

        Action::SetPrompts(task_id, prompts) => {
            if !state.knows_task(task_id) {
                tracing::debug!(task_id, "dropping prompt list for unknown task");
                return state;
            }
            let prompts = dedup_by_id(
                prompts.into_iter().filter(|p| p.task_id == task_id).collect(),
                |p| p.id,
            );
            if let Some(selected) = state.selection.prompt {
                let was_here = state.prompts_for(task_id).iter().any(|p| p.id == selected);
                if was_here && !prompts.iter().any(|p| p.id == selected) {
                    state.selection.prompt = None;
                }
            }
            state.prompts_by_task.insert(task_id, prompts);
        }
        Action::AddPrompt(prompt) => {
            if !state.knows_task(prompt.task_id) {
                tracing::debug!(prompt_id = prompt.id, "dropping prompt for unknown task");
                return state;
            }
            let bucket = state.prompts_by_task.entry(prompt.task_id).or_default();
            upsert(bucket, prompt, |p| p.id);
        }
        Action::UpdatePrompt(id, patch) => {
            if let Some(prompt) = state
                .prompts_by_task
                .values_mut()
                .flatten()
                .find(|p| p.id == id)
            {
                prompt.apply(&patch);
            }
        }
        Action::RemovePrompt(id) => {
            for prompts in state.prompts_by_task.values_mut() {
                prompts.retain(|p| p.id != id);
            }
            if state.selection.prompt == Some(id) {
                state.selection.prompt = None;
            }
        }

        Action::SelectProject(id) => {
            state.selection = Selection {
                project: id,
                task: None,
                prompt: None,
            };
        }
        Action::SelectTask(id) => {
            state.selection.task = id;
            state.selection.prompt = None;
        }
        Action::SelectPrompt(id) => state.selection.prompt = id,

        Action::SetSettingsOpen(open) => state.settings_open = open,
        Action::SetSearchOpen(open) => state.search_open = open,
        Action::SetLoading(loading) => state.loading = loading,

        Action::Reset => state = AppState::default(),
    }
    state
}

type Listener = Arc<dyn Fn(&AppState) + Send + Sync>;

struct StoreInner {
    state: RwLock<AppState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
    dispatch_lock: Mutex<()>,
}

/// Observable wrapper around [`reduce`].
///
/// `dispatch` applies the action under a short write lock and then calls
/// every listener synchronously with the new state. Listeners must not
/// dispatch from inside the callback.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

/// Detaches its listener when dropped or on [`StoreSubscription::unsubscribe`].
pub struct StoreSubscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl StoreSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                dispatch_lock: Mutex::new(()),
            }),
        }
    }

    pub fn dispatch(&self, action: Action) {
        // Serializes dispatches so listeners observe states in commit order.
        let _ordering = self.inner.dispatch_lock.lock();
        let snapshot = {
            let mut state = self.inner.state.write();
            let current = std::mem::take(&mut *state);
            *state = reduce(current, action);
            state.clone()
        };
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.state.read().clone()
    }

    /// Runs `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.inner.state.read())
    }

    pub fn selection(&self) -> Selection {
        self.inner.state.read().selection
    }

    pub fn subscribe<F>(&self, listener: F) -> StoreSubscription
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        StoreSubscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
