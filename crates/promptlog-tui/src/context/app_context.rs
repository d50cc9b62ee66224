use parking_lot::RwLock;
use promptlog_core::{Bus, THEME_CHANGED};
use promptlog_types::PromptSort;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use super::layout::{Divider, PaneLayout, PROMPT_LIST_BOUNDS, SIDEBAR_BOUNDS};
use crate::theme::{Theme, ThemeMode};

const KEY_THEME: &str = "theme";
const KEY_SIDEBAR_OPEN: &str = "sidebarOpen";
const KEY_PROMPT_SORT: &str = "promptSort";

/// Client-local UI preferences. Entity data lives in the store, not here.
pub struct AppContext {
    pub bus: Bus,
    pub theme: RwLock<Theme>,
    pub panes: RwLock<PaneLayout>,
    pub prompt_sort: RwLock<PromptSort>,
    ui_kv: RwLock<UiKv>,
}

impl AppContext {
    pub fn new(bus: Bus) -> Self {
        Self::with_kv_path(bus, ui_kv_path())
    }

    pub fn with_kv_path(bus: Bus, path: Option<PathBuf>) -> Self {
        let ui_kv = UiKv::load(path);
        let mode = ThemeMode::parse(&ui_kv.get_string(KEY_THEME, "dark")).unwrap_or_default();
        let mut panes = PaneLayout::new(
            ui_kv.get_u32(Divider::Sidebar.storage_key(), SIDEBAR_BOUNDS.default),
            ui_kv.get_u32(Divider::PromptList.storage_key(), PROMPT_LIST_BOUNDS.default),
        );
        panes.sidebar_open = ui_kv.get_bool(KEY_SIDEBAR_OPEN, true);
        let sort = PromptSort::parse(&ui_kv.get_string(KEY_PROMPT_SORT, "created")).unwrap_or_default();

        Self {
            bus,
            theme: RwLock::new(Theme::for_mode(mode)),
            panes: RwLock::new(panes),
            prompt_sort: RwLock::new(sort),
            ui_kv: RwLock::new(ui_kv),
        }
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme.read().mode
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) {
        *self.theme.write() = Theme::for_mode(mode);
        self.ui_kv.write().set_string(KEY_THEME, mode.as_str());
        self.bus
            .publish(&THEME_CHANGED, serde_json::json!({ "mode": mode.as_str() }));
    }

    pub fn toggle_theme(&self) -> ThemeMode {
        let next = self.theme_mode().toggle();
        self.set_theme_mode(next);
        next
    }

    pub fn toggle_sidebar(&self) -> bool {
        let open = self.panes.write().toggle_sidebar();
        self.ui_kv.write().set_bool(KEY_SIDEBAR_OPEN, open);
        open
    }

    pub fn persist_pane_width(&self, divider: Divider, width: u32) {
        self.ui_kv
            .write()
            .set_value(divider.storage_key(), Value::from(width));
    }

    pub fn prompt_sort(&self) -> PromptSort {
        *self.prompt_sort.read()
    }

    pub fn toggle_prompt_sort(&self) -> PromptSort {
        let mut sort = self.prompt_sort.write();
        *sort = sort.toggle();
        self.ui_kv.write().set_string(KEY_PROMPT_SORT, sort.label());
        *sort
    }
}

#[derive(Default)]
struct UiKv {
    path: Option<PathBuf>,
    values: HashMap<String, Value>,
}

impl UiKv {
    fn load(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<HashMap<String, Value>>(&content).ok())
            .unwrap_or_default();

        Self {
            path: Some(path),
            values,
        }
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(Value::Bool(flag)) => *flag,
            _ => default,
        }
    }

    fn get_u32(&self, key: &str, default: u32) -> u32 {
        self.values
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(Value::String(s)) => s.clone(),
            _ => default.to_string(),
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.set_value(key, Value::Bool(value));
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.set_value(key, Value::String(value.to_string()));
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(%err, "failed to create UI state directory");
                return;
            }
        }

        let payload = match serde_json::to_string_pretty(&self.values) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%err, "failed to encode UI state");
                return;
            }
        };

        if let Err(err) = fs::write(path, payload) {
            tracing::warn!(%err, "failed to persist UI state");
        }
    }
}

fn ui_kv_path() -> Option<PathBuf> {
    dirs::state_dir()
        .map(|dir| dir.join("promptlog").join("kv.json"))
        .or_else(|| {
            dirs::home_dir().map(|home| {
                home.join(".local")
                    .join("state")
                    .join("promptlog")
                    .join("kv.json")
            })
        })
}
