use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::bus::{Bus, BusEventDef, Subscription};

pub const NOTIFICATION_PUBLISHED: BusEventDef = BusEventDef::new("notification.published");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
}

/// Publishes short-lived user-facing messages on the bus.
///
/// Ids increase monotonically per notifier; identical messages are never
/// merged.
#[derive(Clone)]
pub struct Notifier {
    bus: Bus,
    next_id: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new(bus: Bus) -> Self {
        Self {
            bus,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.publish(Severity::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.publish(Severity::Error, message.into())
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.publish(Severity::Warning, message.into())
    }

    pub fn publish(&self, severity: Severity, message: String) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            severity,
            message,
        };
        match serde_json::to_value(&notification) {
            Ok(props) => self.bus.publish(&NOTIFICATION_PUBLISHED, props),
            Err(err) => tracing::warn!(%err, "failed to encode notification"),
        }
        id
    }

    /// Registers a typed handler for every published notification.
    pub fn on_notification<F>(&self, handler: F) -> Subscription
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        self.bus
            .subscribe(&NOTIFICATION_PUBLISHED, move |_, props| {
                if let Ok(notification) = serde_json::from_value::<Notification>(props.clone()) {
                    handler(notification);
                }
            })
    }
}
