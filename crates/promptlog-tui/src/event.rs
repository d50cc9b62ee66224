use crossterm::event::{KeyEvent, MouseEvent};
use promptlog_core::Notification;
use promptlog_types::SearchResult;
use tokio::sync::oneshot;

use crate::api::GatewayError;

#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    Tick,
    Custom(CustomEvent),
}

/// Events produced off the UI thread: store commits, finished backend calls,
/// and questions the controller needs answered.
#[derive(Debug)]
pub enum CustomEvent {
    StoreChanged,
    /// A spawned controller job returned; state outside the store may differ.
    JobFinished,
    SearchFinished {
        generation: u64,
        result: Result<Vec<SearchResult>, GatewayError>,
    },
    Confirm {
        message: String,
        reply: oneshot::Sender<bool>,
    },
    Notification(Notification),
    ThemeChanged,
    DbPath(Option<String>),
}

pub struct EventBus {
    tx: std::sync::mpsc::Sender<Event>,
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl EventBus {
    pub fn new(tx: std::sync::mpsc::Sender<Event>) -> Self {
        Self { tx }
    }

    pub fn sender(&self) -> std::sync::mpsc::Sender<Event> {
        self.tx.clone()
    }

    /// Returns false once the UI loop has gone away.
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn send_custom(&self, event: CustomEvent) -> bool {
        self.send(Event::Custom(event))
    }
}
