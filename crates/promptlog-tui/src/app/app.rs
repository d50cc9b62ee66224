use std::future::Future;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use promptlog_config::Config;
use promptlog_core::{Bus, Notifier, Subscription, THEME_CHANGED};
use promptlog_types::PromptEntry;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::api::Gateway;
use crate::components::header::APP_NAME;
use crate::components::prompt_list::ordered_ids;
use crate::components::{
    flatten, ConfirmDialog, Header, InputDialog, InputPurpose, ProjectTree, ProjectTreeState,
    PromptEditor, PromptList, PromptListState, SearchOverlayView, SettingsAction, SettingsDialog,
    ToastTray, TreeRow,
};
use crate::context::{
    Action, AppContext, AppState, Divider, EditState, PromptDraft, PromptField, StoreSubscription,
};
use crate::controller::{default_export_file_name, Confirmer, Controller};
use crate::event::{CustomEvent, Event, EventBus};
use crate::search::SearchOverlay;
use crate::terminal;
use crate::ui::layout::{col_to_px, panes, Panes};
use crate::ui::Clipboard;

// ~60 fps frame budget.
const TICK_RATE_MS: u64 = 16;
const MAX_EVENTS_PER_FRAME: usize = 256;
const DOUBLE_CLICK_MS: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tree,
    List,
    Editor,
}

impl Focus {
    /// Next pane in Tab order. The tree is skipped while the sidebar is hidden.
    pub fn next(self, sidebar_open: bool) -> Self {
        match self {
            Focus::Tree => Focus::List,
            Focus::List => Focus::Editor,
            Focus::Editor if sidebar_open => Focus::Tree,
            Focus::Editor => Focus::List,
        }
    }
}

/// Routes controller questions to the confirmation dialog and waits for the
/// user's answer. A closed UI counts as "no".
struct DialogConfirmer {
    events: EventBus,
}

#[async_trait]
impl Confirmer for DialogConfirmer {
    async fn confirm(&self, message: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let sent = self.events.send_custom(CustomEvent::Confirm {
            message: message.to_string(),
            reply,
        });
        if !sent {
            return false;
        }
        answer.await.unwrap_or(false)
    }
}

pub struct App {
    runtime: Handle,
    context: Arc<AppContext>,
    controller: Controller,
    terminal: terminal::Tui,
    events: EventBus,
    event_rx: Receiver<Event>,
    bus_subscriptions: Vec<Subscription>,
    _store_subscription: StoreSubscription,
    focus: Focus,
    tree: ProjectTreeState,
    prompt_list: PromptListState,
    prompt_edit: EditState<PromptDraft>,
    search: SearchOverlay,
    toasts: ToastTray,
    confirm: ConfirmDialog,
    input: InputDialog,
    settings: SettingsDialog,
    panes: Option<Panes>,
    screen: Rect,
    last_divider_click: Option<(Divider, Instant)>,
    last_tick: Instant,
    title: String,
    exiting: bool,
}

impl App {
    pub fn new(config: &Config, gateway: Arc<dyn Gateway>, runtime: Handle) -> anyhow::Result<Self> {
        let bus = Bus::new();
        let notifier = Notifier::new(bus.clone());
        let store = crate::context::Store::new();
        let context = Arc::new(AppContext::new(bus.clone()));

        let (event_tx, event_rx) = mpsc::channel();
        let events = EventBus::new(event_tx);
        let confirmer = Arc::new(DialogConfirmer {
            events: events.clone(),
        });
        let controller = Controller::new(gateway, store.clone(), notifier.clone(), confirmer)
            .with_search_limit(config.search_limit());

        let store_events = events.clone();
        let store_subscription = store.subscribe(move |_| {
            store_events.send_custom(CustomEvent::StoreChanged);
        });
        let toast_events = events.clone();
        let notifications = notifier.on_notification(move |notification| {
            toast_events.send_custom(CustomEvent::Notification(notification));
        });
        let theme_events = events.clone();
        let theme = bus.subscribe(&THEME_CHANGED, move |_, _| {
            theme_events.send_custom(CustomEvent::ThemeChanged);
        });

        let terminal = terminal::init()?;
        Self::spawn_input_thread(events.sender());

        let duration_ms = u64::try_from(config.notification_duration().as_millis()).unwrap_or(u64::MAX);

        Ok(Self {
            runtime,
            context,
            controller,
            terminal,
            events,
            event_rx,
            bus_subscriptions: vec![notifications, theme],
            _store_subscription: store_subscription,
            focus: Focus::Tree,
            tree: ProjectTreeState::default(),
            prompt_list: PromptListState::default(),
            prompt_edit: EditState::new(),
            search: SearchOverlay::new(config.search_debounce()),
            toasts: ToastTray::new(duration_ms),
            confirm: ConfirmDialog::new(),
            input: InputDialog::new(),
            settings: SettingsDialog::new(),
            panes: None,
            screen: Rect::default(),
            last_divider_click: None,
            last_tick: Instant::now(),
            title: String::new(),
            exiting: false,
        })
    }

    fn spawn_input_thread(event_tx: Sender<Event>) {
        let tick_rate = Duration::from_millis(TICK_RATE_MS);
        thread::spawn(move || {
            let mut last_tick = Instant::now();

            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(tick_rate);

                if crossterm::event::poll(timeout).unwrap_or(false) {
                    let event = match crossterm::event::read() {
                        Ok(crossterm::event::Event::Key(key)) => Some(Event::Key(key)),
                        Ok(crossterm::event::Event::Mouse(mouse))
                            if !matches!(mouse.kind, MouseEventKind::Moved) =>
                        {
                            Some(Event::Mouse(mouse))
                        }
                        Ok(crossterm::event::Event::Resize(w, h)) => Some(Event::Resize(w, h)),
                        _ => None,
                    };

                    if let Some(e) = event {
                        if event_tx.send(e).is_err() {
                            break;
                        }
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        self.spawn(|c| async move {
            c.load_projects().await;
        });
        let _ = terminal::set_title(APP_NAME);
        self.draw()?;

        let tick = Duration::from_millis(TICK_RATE_MS);
        while !self.exiting {
            let mut should_draw = false;

            // Wake early when a debounced search falls due before the next tick.
            let wait = self
                .search
                .next_deadline(Instant::now())
                .map_or(tick, |due| due.min(tick));
            let first_event = match self.event_rx.recv_timeout(wait) {
                Ok(event) => Some(event),
                Err(mpsc::RecvTimeoutError::Timeout) => None,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            };

            if let Some(event) = first_event {
                should_draw |= self.handle_event(event);

                for _ in 0..MAX_EVENTS_PER_FRAME {
                    let next = match self.event_rx.try_recv() {
                        Ok(next) => next,
                        Err(mpsc::TryRecvError::Empty) => break,
                        Err(mpsc::TryRecvError::Disconnected) => {
                            self.exiting = true;
                            break;
                        }
                    };
                    should_draw |= self.handle_event(next);
                }
            } else {
                should_draw |= self.poll_search(Instant::now());
            }

            if should_draw {
                self.draw()?;
            }
        }

        self.shutdown();
        terminal::restore()?;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.confirm.answer(false);
        // The runtime outlives this thread only until the caller returns, so
        // an open draft is saved before leaving.
        if let Some(save) = self.controller.blur_prompt_edit(&mut self.prompt_edit) {
            self.runtime.block_on(save);
        }
        for subscription in self.bus_subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        tracing::info!("tui closed");
    }

    /// Runs a controller job on the runtime and wakes the UI when it returns.
    fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let fut = job(self.controller.clone());
        let events = self.events.clone();
        self.runtime.spawn(async move {
            fut.await;
            events.send_custom(CustomEvent::JobFinished);
        });
    }

    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(..) => true,
            Event::Tick => self.handle_tick(),
            Event::Custom(custom) => self.handle_custom(custom),
        }
    }

    fn handle_tick(&mut self) -> bool {
        let now = Instant::now();
        let delta = u64::try_from(now.duration_since(self.last_tick).as_millis()).unwrap_or(0);
        self.last_tick = now;

        let toasts_changed = self.toasts.tick(delta);
        self.poll_search(now) || toasts_changed
    }

    /// Fires the debounced search once it is due.
    fn poll_search(&mut self, now: Instant) -> bool {
        let Some(pending) = self.search.poll(now) else {
            return false;
        };
        let events = self.events.clone();
        let controller = self.controller.clone();
        self.runtime.spawn(async move {
            let result = controller.search(&pending.keyword).await;
            events.send_custom(CustomEvent::SearchFinished {
                generation: pending.generation,
                result,
            });
        });
        true
    }

    fn handle_custom(&mut self, event: CustomEvent) -> bool {
        match event {
            CustomEvent::StoreChanged | CustomEvent::JobFinished => {
                self.sync_with_store();
                true
            }
            CustomEvent::SearchFinished { generation, result } => match result {
                Ok(results) => self.search.apply_results(generation, results),
                Err(err) => {
                    if !self.search.apply_failure(generation) {
                        return false;
                    }
                    tracing::error!(%err, "search failed");
                    self.controller
                        .notifier()
                        .error(format!("Search failed: {err}"));
                    true
                }
            },
            CustomEvent::Confirm { message, reply } => {
                self.confirm.open(&message, reply);
                true
            }
            CustomEvent::Notification(notification) => {
                self.toasts.push(notification);
                true
            }
            CustomEvent::ThemeChanged => true,
            CustomEvent::DbPath(path) => {
                self.settings.set_db_path(path);
                true
            }
        }
    }

    /// Re-aims cursors at the selection and drops an edit whose prompt is gone.
    fn sync_with_store(&mut self) {
        let state = self.controller.store().snapshot();
        let rows = flatten(&state, &self.controller.expanded_projects());
        self.tree.follow_selection(&rows, &state.selection);

        if let Some(task_id) = state.selection.task {
            let ordered = ordered_ids(state.prompts_for(task_id), self.context.prompt_sort());
            self.prompt_list.follow(&ordered, state.selection.prompt);
        }

        if let Some(id) = self.prompt_edit.editing_id() {
            if state.prompt(id).is_none() {
                self.prompt_edit.cancel();
            }
        }

        let crumb = breadcrumb(&state);
        if crumb != self.title {
            let _ = terminal::set_breadcrumb_title(&crumb);
            self.title = crumb;
        }
    }

    // ---- keyboard -------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('q') {
            self.exiting = true;
            return true;
        }
        if ctrl && key.code == KeyCode::Char('d') {
            self.toasts.dismiss_latest();
            return true;
        }

        if self.confirm.is_open() {
            return self.handle_confirm_key(key);
        }
        if self.input.is_open() {
            return self.handle_input_key(key);
        }
        if self.prompt_edit.is_active() {
            return self.handle_draft_key(key);
        }
        let (search_open, settings_open) = self
            .controller
            .store()
            .read(|s| (s.search_open, s.settings_open));
        if search_open {
            return self.handle_search_key(key);
        }
        if settings_open {
            return self.handle_settings_key(key);
        }
        if ctrl {
            return self.handle_global_key(key);
        }
        if key.code == KeyCode::Tab {
            self.focus = self.focus.next(self.context.panes.read().sidebar_open);
            return true;
        }

        match self.focus {
            Focus::Tree => self.handle_tree_key(key),
            Focus::List => self.handle_list_key(key),
            Focus::Editor => self.handle_editor_key(key),
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('k') => {
                self.search.reset();
                self.controller.store().dispatch(Action::SetSearchOpen(true));
            }
            KeyCode::Char('t') => {
                self.context.toggle_theme();
            }
            KeyCode::Char('b') => {
                let open = self.context.toggle_sidebar();
                if !open && self.focus == Focus::Tree {
                    self.focus = Focus::List;
                }
            }
            KeyCode::Char('s') => {
                let sort = self.context.toggle_prompt_sort();
                tracing::debug!(sort = sort.label(), "prompt sort changed");
                self.sync_with_store();
            }
            KeyCode::Char('o') => self.open_settings(),
            _ => return false,
        }
        true
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.confirm.handle_left(),
            KeyCode::Right | KeyCode::Char('l') => self.confirm.handle_right(),
            KeyCode::Tab => self.confirm.toggle_focus(),
            KeyCode::Enter => self.confirm.submit(),
            KeyCode::Char('y') => self.confirm.answer(true),
            KeyCode::Char('n') | KeyCode::Esc => self.confirm.answer(false),
            _ => return false,
        }
        true
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => self.input.close(),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Enter => {
                if let Some((purpose, value)) = self.input.submit() {
                    self.submit_input(purpose, value);
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c)
            }
            _ => return false,
        }
        true
    }

    fn submit_input(&mut self, purpose: InputPurpose, value: String) {
        match purpose {
            InputPurpose::NewProject => self.spawn(move |c| async move {
                c.create_project(&value).await;
            }),
            InputPurpose::NewTask(project_id) => self.spawn(move |c| async move {
                c.create_task(project_id, &value, None).await;
            }),
            InputPurpose::RenameProject(id) => self.spawn(move |c| async move {
                c.rename_project(id, &value).await;
            }),
            InputPurpose::RenameTask(id) => self.spawn(move |c| async move {
                c.rename_task(id, &value).await;
            }),
            InputPurpose::ExportPath => self.spawn(move |c| async move {
                c.export_data(&value).await;
            }),
            InputPurpose::ImportPath => self.spawn(move |c| async move {
                c.import_data(&value).await;
            }),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> bool {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => self.close_search(),
            KeyCode::Up => self.search.move_selection(-1),
            KeyCode::Down => self.search.move_selection(1),
            KeyCode::Backspace => self.search.backspace(now),
            KeyCode::Enter => {
                let Some(result) = self.search.selected_result().cloned() else {
                    return false;
                };
                self.close_search();
                self.focus = Focus::List;
                self.spawn(move |c| async move {
                    c.focus_search_result(&result).await;
                });
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.push_char(c, now)
            }
            _ => return false,
        }
        true
    }

    fn close_search(&mut self) {
        self.search.reset();
        self.controller
            .store()
            .dispatch(Action::SetSearchOpen(false));
    }

    fn open_settings(&mut self) {
        self.settings.open();
        self.controller
            .store()
            .dispatch(Action::SetSettingsOpen(true));
        let events = self.events.clone();
        self.spawn(move |c| async move {
            let path = c.database_path().await;
            events.send_custom(CustomEvent::DbPath(path));
        });
    }

    fn close_settings(&mut self) {
        self.settings.close();
        self.controller
            .store()
            .dispatch(Action::SetSettingsOpen(false));
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => self.close_settings(),
            KeyCode::Up | KeyCode::Char('k') => self.settings.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.settings.move_selection(1),
            KeyCode::Enter => {
                let action = self.settings.selected_action();
                self.close_settings();
                match action {
                    SettingsAction::Export => {
                        let path = default_export_path(
                            dirs::download_dir().or_else(dirs::home_dir),
                            chrono::Local::now().date_naive(),
                        );
                        self.input
                            .open(InputPurpose::ExportPath, &path.to_string_lossy());
                    }
                    SettingsAction::Import => self.input.open(InputPurpose::ImportPath, ""),
                }
            }
            _ => return false,
        }
        true
    }

    fn tree_rows(&self) -> Vec<TreeRow> {
        let expanded = self.controller.expanded_projects();
        self.controller.store().read(|s| flatten(s, &expanded))
    }

    fn handle_tree_key(&mut self, key: KeyEvent) -> bool {
        let rows = self.tree_rows();
        let current = rows.get(self.tree.cursor).cloned();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.tree.move_cursor(-1, rows.len()),
            KeyCode::Down | KeyCode::Char('j') => self.tree.move_cursor(1, rows.len()),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                let Some(row) = current else { return false };
                let is_task = matches!(row, TreeRow::Task { .. });
                self.activate_tree_row(row);
                if is_task {
                    self.focus = Focus::List;
                }
            }
            KeyCode::Char(' ') => {
                let Some(TreeRow::Project { id, .. }) = current else {
                    return false;
                };
                self.spawn(move |c| async move {
                    c.toggle_project_expanded(id).await;
                });
            }
            KeyCode::Left | KeyCode::Char('h') => match current {
                Some(TreeRow::Project { id, expanded: true, .. }) => {
                    self.spawn(move |c| async move {
                        c.toggle_project_expanded(id).await;
                    });
                }
                Some(TreeRow::Task { project_id, .. }) | Some(TreeRow::Loading { project_id }) => {
                    if let Some(idx) = rows.iter().position(
                        |r| matches!(r, TreeRow::Project { id, .. } if *id == project_id),
                    ) {
                        self.tree.cursor = idx;
                    }
                }
                _ => return false,
            },
            KeyCode::Char('n') => self.input.open(InputPurpose::NewProject, ""),
            KeyCode::Char('t') => {
                let project_id = current
                    .map(|r| r.project_id())
                    .or(self.controller.store().selection().project);
                let Some(project_id) = project_id else {
                    return false;
                };
                self.input.open(InputPurpose::NewTask(project_id), "");
            }
            KeyCode::Char('r') => match current {
                Some(TreeRow::Project { id, name, .. }) => {
                    self.input.open(InputPurpose::RenameProject(id), &name)
                }
                Some(TreeRow::Task { id, name, .. }) => {
                    self.input.open(InputPurpose::RenameTask(id), &name)
                }
                _ => return false,
            },
            KeyCode::Char('x') | KeyCode::Delete => match current {
                Some(TreeRow::Project { id, .. }) => self.spawn(move |c| async move {
                    c.delete_project(id).await;
                }),
                Some(TreeRow::Task { id, .. }) => self.spawn(move |c| async move {
                    c.delete_task(id).await;
                }),
                _ => return false,
            },
            _ => return false,
        }
        true
    }

    /// Selecting an already selected, expanded project collapses it.
    fn activate_tree_row(&mut self, row: TreeRow) {
        match row {
            TreeRow::Project { id, expanded, .. } => {
                let selected = self.controller.store().selection().project == Some(id);
                if selected && expanded {
                    self.spawn(move |c| async move {
                        c.toggle_project_expanded(id).await;
                    });
                } else {
                    self.spawn(move |c| async move {
                        c.select_project(id).await;
                    });
                }
            }
            TreeRow::Task { id, .. } => self.spawn(move |c| async move {
                c.select_task(id).await;
            }),
            TreeRow::Loading { .. } => {}
        }
    }

    fn visible_prompt_ids(&self) -> Vec<i64> {
        let sort = self.context.prompt_sort();
        self.controller.store().read(|s| match s.selection.task {
            Some(task_id) => ordered_ids(s.prompts_for(task_id), sort),
            None => Vec::new(),
        })
    }

    fn select_prompt_at_cursor(&mut self) {
        let ids = self.visible_prompt_ids();
        if let Some(id) = ids.get(self.prompt_list.cursor) {
            self.controller.select_prompt(Some(*id));
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.visible_prompt_ids().len();
                self.prompt_list.move_cursor(-1, len);
                self.select_prompt_at_cursor();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.visible_prompt_ids().len();
                self.prompt_list.move_cursor(1, len);
                self.select_prompt_at_cursor();
            }
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                self.select_prompt_at_cursor();
                self.focus = Focus::Editor;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.context.panes.read().sidebar_open {
                    self.focus = Focus::Tree;
                }
            }
            KeyCode::Char('a') => {
                let Some(task_id) = self.controller.store().selection().task else {
                    return false;
                };
                self.spawn(move |c| async move {
                    c.create_prompt(task_id).await;
                });
            }
            KeyCode::Char('e') => return self.begin_prompt_edit(),
            KeyCode::Char('y') => self.copy_selected_prompt(),
            KeyCode::Char('x') | KeyCode::Delete => return self.delete_selected_prompt(),
            _ => return false,
        }
        true
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('e') | KeyCode::Enter => self.begin_prompt_edit(),
            KeyCode::Char('y') => {
                self.copy_selected_prompt();
                true
            }
            KeyCode::Char('x') | KeyCode::Delete => self.delete_selected_prompt(),
            KeyCode::Left | KeyCode::Esc => {
                self.focus = Focus::List;
                true
            }
            _ => false,
        }
    }

    fn selected_prompt(&self) -> Option<PromptEntry> {
        self.controller
            .store()
            .read(|s| s.selected_prompt().cloned())
    }

    fn begin_prompt_edit(&mut self) -> bool {
        let Some(entry) = self.selected_prompt() else {
            return false;
        };
        self.prompt_edit
            .begin(entry.id, PromptDraft::from_entry(&entry));
        self.focus = Focus::Editor;
        true
    }

    fn delete_selected_prompt(&mut self) -> bool {
        let Some(id) = self.controller.store().selection().prompt else {
            return false;
        };
        self.spawn(move |c| async move {
            c.delete_prompt(id).await;
        });
        true
    }

    fn copy_selected_prompt(&self) {
        let Some(entry) = self.selected_prompt() else {
            return;
        };
        let text = if entry.is_placeholder_content() {
            ""
        } else {
            entry.content.as_str()
        };
        let notifier = self.controller.notifier();
        match Clipboard::write_text(text) {
            Ok(()) => {
                notifier.success("Copied to clipboard");
            }
            Err(err) => {
                tracing::warn!(%err, "clipboard write failed");
                notifier.error(format!("Copy failed: {err}"));
            }
        }
    }

    /// Closes the open prompt draft and saves it in the background.
    fn blur_prompt_edit(&mut self) -> bool {
        let Some(save) = self.controller.blur_prompt_edit(&mut self.prompt_edit) else {
            return false;
        };
        self.spawn(move |_| async move {
            save.await;
        });
        true
    }

    fn handle_draft_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.blur_prompt_edit();
                return true;
            }
            KeyCode::Char('x') if ctrl => {
                self.prompt_edit.cancel();
                return true;
            }
            _ => {}
        }

        let Some(draft) = self.prompt_edit.draft_mut() else {
            return false;
        };
        match key.code {
            KeyCode::Tab => draft.field = draft.field.next(),
            KeyCode::Enter if draft.field == PromptField::Content => draft.content.push('\n'),
            KeyCode::Enter => draft.field = draft.field.next(),
            KeyCode::Backspace => {
                draft.active_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => draft.active_mut().push(c),
            _ => return false,
        }
        true
    }

    // ---- mouse ----------------------------------------------------------

    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let Some(panes) = self.panes else {
            return false;
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(id) = self.toasts.hit(self.screen, mouse.column, mouse.row) {
                    self.toasts.dismiss(id);
                    return true;
                }
                let blurred = self.prompt_edit.is_active()
                    && click_leaves_editor(&panes, mouse.column, mouse.row)
                    && self.blur_prompt_edit();
                if let Some(divider) = divider_at(&panes, mouse.column, mouse.row) {
                    return self.press_divider(divider) || blurred;
                }
                self.click(mouse.column, mouse.row) || blurred
            }
            MouseEventKind::Drag(MouseButton::Left) => self
                .context
                .panes
                .write()
                .pointer_move(col_to_px(mouse.column.saturating_add(1)))
                .is_some(),
            MouseEventKind::Up(MouseButton::Left) => {
                let released = self.context.panes.write().pointer_up();
                match released {
                    Some((divider, width)) => {
                        self.context.persist_pane_width(divider, width);
                        true
                    }
                    None => false,
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let delta = if mouse.kind == MouseEventKind::ScrollUp { -1 } else { 1 };
                if self.tree.row_at(mouse.column, mouse.row).is_some() {
                    let len = self.tree_rows().len();
                    self.tree.move_cursor(delta, len);
                    true
                } else if self.prompt_list.row_at(mouse.column, mouse.row).is_some() {
                    let len = self.visible_prompt_ids().len();
                    self.prompt_list.move_cursor(delta, len);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    fn press_divider(&mut self, divider: Divider) -> bool {
        let now = Instant::now();
        let double = matches!(
            self.last_divider_click,
            Some((last, at)) if last == divider
                && now.duration_since(at) <= Duration::from_millis(DOUBLE_CLICK_MS)
        );
        if double {
            self.last_divider_click = None;
            let width = self.context.panes.write().double_click(divider);
            self.context.persist_pane_width(divider, width);
            return true;
        }
        self.last_divider_click = Some((divider, now));
        self.context.panes.write().pointer_down(divider)
    }

    fn click(&mut self, column: u16, row: u16) -> bool {
        if let Some(idx) = self.tree.row_at(column, row) {
            let rows = self.tree_rows();
            let Some(clicked) = rows.get(idx).cloned() else {
                return false;
            };
            self.tree.cursor = idx;
            self.focus = Focus::Tree;
            self.activate_tree_row(clicked);
            return true;
        }
        if let Some(idx) = self.prompt_list.row_at(column, row) {
            let ids = self.visible_prompt_ids();
            let Some(id) = ids.get(idx) else {
                return false;
            };
            self.prompt_list.cursor = idx;
            self.focus = Focus::List;
            self.controller.select_prompt(Some(*id));
            return true;
        }
        false
    }

    // ---- drawing --------------------------------------------------------

    fn draw(&mut self) -> anyhow::Result<()> {
        let state = self.controller.store().snapshot();
        let rows = flatten(&state, &self.controller.expanded_projects());
        let theme = self.context.theme.read().clone();
        let layout = self.context.panes.read().clone();
        let sort = self.context.prompt_sort();
        let crumb = breadcrumb(&state);
        let focus = self.focus;
        let footer = footer_hint(focus, self.prompt_edit.is_active());

        let Self {
            terminal,
            tree,
            prompt_list,
            prompt_edit,
            search,
            toasts,
            confirm,
            input,
            settings,
            ..
        } = self;

        let mut drawn = None;
        let mut screen = Rect::default();
        terminal.draw(|frame| {
            let area = frame.size();
            screen = area;
            frame.render_widget(
                Block::default().style(Style::default().bg(theme.background)),
                area,
            );
            let panes = panes(area, &layout);

            Header::render(frame, panes.header, &crumb, sort, &theme, state.loading);
            if let Some(sidebar) = panes.sidebar {
                ProjectTree::render(
                    frame,
                    sidebar,
                    &rows,
                    &state.selection,
                    tree,
                    &theme,
                    focus == Focus::Tree,
                );
            }
            PromptList::render(
                frame,
                panes.prompt_list,
                state.selection.task.map(|t| state.prompts_for(t)),
                sort,
                state.selection.prompt,
                prompt_list,
                &theme,
                focus == Focus::List,
            );

            let selected = state.selected_prompt();
            let draft = selected
                .filter(|p| prompt_edit.is_editing(p.id))
                .and_then(|_| prompt_edit.draft());
            PromptEditor::render(
                frame,
                panes.editor,
                selected,
                draft,
                &theme,
                focus == Focus::Editor,
            );
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(footer, theme.muted()))),
                panes.footer,
            );

            toasts.render(frame, area, &theme);
            if state.search_open {
                SearchOverlayView::render(frame, area, search, &theme);
            }
            if settings.is_open() {
                settings.render(frame, area, &theme);
            }
            if input.is_open() {
                input.render(frame, area, &theme);
            }
            if confirm.is_open() {
                confirm.render(frame, area, &theme);
            }
            drawn = Some(panes);
        })?;

        self.panes = drawn;
        self.screen = screen;
        Ok(())
    }
}

/// "project / task / prompt" for whatever is currently selected.
fn breadcrumb(state: &AppState) -> String {
    let mut parts = Vec::new();
    if let Some(project) = state.selected_project() {
        parts.push(project.name.clone());
    }
    if let Some(task) = state.selected_task() {
        parts.push(task.name.clone());
    }
    if let Some(prompt) = state.selected_prompt() {
        parts.push(prompt.display_title());
    }
    parts.join(" / ")
}

fn footer_hint(focus: Focus, editing: bool) -> &'static str {
    if editing {
        return " Tab next field · Esc save · Ctrl+X discard · Ctrl+Q quit";
    }
    match focus {
        Focus::Tree => {
            " n project · t task · r rename · x delete · Space expand · Tab focus · Ctrl+O settings · Ctrl+Q quit"
        }
        Focus::List => " a new · e edit · y copy · x delete · Ctrl+S sort · Tab focus · Ctrl+Q quit",
        Focus::Editor => " e edit · y copy · x delete · Esc back · Tab focus · Ctrl+Q quit",
    }
}

/// A press anywhere but the editor pane ends an open prompt edit.
fn click_leaves_editor(panes: &Panes, column: u16, row: u16) -> bool {
    let editor = panes.editor;
    let inside = column >= editor.x
        && column < editor.x + editor.width
        && row >= editor.y
        && row < editor.y + editor.height;
    !inside
}

/// Divider whose grab column is under the pointer, if any.
fn divider_at(panes: &Panes, column: u16, row: u16) -> Option<Divider> {
    let body = panes.prompt_list;
    if row < body.y || row >= body.y + body.height {
        return None;
    }
    if panes.sidebar_divider_col() == Some(column) {
        return Some(Divider::Sidebar);
    }
    if panes.prompt_list_divider_col() == column {
        return Some(Divider::PromptList);
    }
    None
}

fn default_export_path(dir: Option<PathBuf>, today: chrono::NaiveDate) -> PathBuf {
    let file_name = default_export_file_name(today);
    match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::layout::PaneLayout;
    use chrono::Utc;
    use promptlog_types::{Project, Task};
    use ratatui::layout::Rect;

    #[test]
    fn test_focus_cycle_skips_hidden_sidebar() {
        assert_eq!(Focus::Tree.next(true), Focus::List);
        assert_eq!(Focus::List.next(true), Focus::Editor);
        assert_eq!(Focus::Editor.next(true), Focus::Tree);
        assert_eq!(Focus::Editor.next(false), Focus::List);
    }

    #[test]
    fn test_breadcrumb_follows_selection() {
        let state = [
            Action::SetProjects(vec![Project {
                id: 1,
                name: "Docs".into(),
                created_at: Utc::now(),
                updated_at: None,
            }]),
            Action::SetTasks(
                1,
                vec![Task {
                    id: 2,
                    project_id: 1,
                    name: "Intro".into(),
                    description: None,
                    created_at: Utc::now(),
                    updated_at: None,
                }],
            ),
            Action::SelectProject(Some(1)),
        ]
        .into_iter()
        .fold(AppState::default(), crate::context::reduce);
        assert_eq!(breadcrumb(&state), "Docs");

        let state = crate::context::reduce(state, Action::SelectTask(Some(2)));
        assert_eq!(breadcrumb(&state), "Docs / Intro");
    }

    #[test]
    fn test_divider_hit_testing() {
        let layout = PaneLayout::default();
        let panes = panes(Rect::new(0, 0, 200, 50), &layout);
        let sidebar_col = panes.sidebar_divider_col().unwrap();
        let body_row = panes.prompt_list.y + 1;

        assert_eq!(divider_at(&panes, sidebar_col, body_row), Some(Divider::Sidebar));
        assert_eq!(
            divider_at(&panes, panes.prompt_list_divider_col(), body_row),
            Some(Divider::PromptList)
        );
        assert_eq!(divider_at(&panes, sidebar_col, panes.header.y), None);
        assert_eq!(divider_at(&panes, sidebar_col + 3, body_row), None);
    }

    #[test]
    fn test_clicks_outside_editor_end_the_edit() {
        let layout = PaneLayout::default();
        let panes = panes(Rect::new(0, 0, 200, 50), &layout);
        let body_row = panes.editor.y + 2;

        assert!(!click_leaves_editor(&panes, panes.editor.x + 1, body_row));
        assert!(click_leaves_editor(&panes, panes.prompt_list.x + 1, body_row));
        assert!(click_leaves_editor(&panes, 1, body_row));
        assert!(click_leaves_editor(&panes, panes.editor.x + 1, panes.header.y));
    }

    #[test]
    fn test_default_export_path_uses_dated_name() {
        let day = chrono::NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(
            default_export_path(Some(PathBuf::from("/tmp")), day),
            PathBuf::from("/tmp/promptlog_backup_2025-01-09.json")
        );
        assert_eq!(
            default_export_path(None, day),
            PathBuf::from("promptlog_backup_2025-01-09.json")
        );
    }
}
