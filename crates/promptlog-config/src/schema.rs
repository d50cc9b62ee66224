use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:1420";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GatewayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SearchConfig {
    #[serde(alias = "debounceMs", skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NotificationConfig {
    #[serde(alias = "durationMs", skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn merge_option_replace<T>(target: &mut Option<T>, source: Option<T>) {
    if let Some(value) = source {
        *target = Some(value);
    }
}

impl Config {
    /// Overlays every field that is set in `other`.
    pub fn merge(&mut self, other: Config) {
        if let Some(gateway) = other.gateway {
            let target = self.gateway.get_or_insert_with(Default::default);
            merge_option_replace(&mut target.url, gateway.url);
        }
        if let Some(search) = other.search {
            let target = self.search.get_or_insert_with(Default::default);
            merge_option_replace(&mut target.debounce_ms, search.debounce_ms);
            merge_option_replace(&mut target.limit, search.limit);
        }
        if let Some(notifications) = other.notifications {
            let target = self.notifications.get_or_insert_with(Default::default);
            merge_option_replace(&mut target.duration_ms, notifications.duration_ms);
        }
        if let Some(log) = other.log {
            let target = self.log.get_or_insert_with(Default::default);
            merge_option_replace(&mut target.level, log.level);
            merge_option_replace(&mut target.dir, log.dir);
        }
    }

    pub fn gateway_url(&self) -> &str {
        self.gateway
            .as_ref()
            .and_then(|g| g.url.as_deref())
            .unwrap_or(DEFAULT_GATEWAY_URL)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(
            self.search
                .as_ref()
                .and_then(|s| s.debounce_ms)
                .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS),
        )
    }

    pub fn search_limit(&self) -> u32 {
        self.search
            .as_ref()
            .and_then(|s| s.limit)
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(
            self.notifications
                .as_ref()
                .and_then(|n| n.duration_ms)
                .unwrap_or(DEFAULT_NOTIFICATION_DURATION_MS),
        )
    }

    pub fn log_level(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log.as_ref().and_then(|l| l.dir.clone())
    }
}
