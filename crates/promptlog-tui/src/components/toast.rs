use promptlog_core::{Notification, Severity};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

const TRANSITION_MS: u64 = 120;
const TOAST_WIDTH: u16 = 40;
const MAX_VISIBLE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ToastPhase {
    Entering,
    Visible,
    Exiting,
}

#[derive(Debug, Clone)]
struct ToastItem {
    notification: Notification,
    phase: ToastPhase,
    phase_elapsed_ms: u64,
}

/// Bottom-right stack of notifications. Each one dismisses itself after the
/// configured duration or earlier on request.
pub struct ToastTray {
    items: Vec<ToastItem>,
    duration_ms: u64,
}

impl ToastTray {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            items: Vec::new(),
            duration_ms,
        }
    }

    pub fn push(&mut self, notification: Notification) {
        self.items.push(ToastItem {
            notification,
            phase: ToastPhase::Entering,
            phase_elapsed_ms: 0,
        });
    }

    /// Starts the exit transition for `id`. Unknown ids are ignored.
    pub fn dismiss(&mut self, id: u64) {
        if let Some(item) = self.items.iter_mut().find(|i| i.notification.id == id) {
            if item.phase != ToastPhase::Exiting {
                item.phase = ToastPhase::Exiting;
                item.phase_elapsed_ms = 0;
            }
        }
    }

    pub fn dismiss_latest(&mut self) {
        if let Some(id) = self
            .items
            .iter()
            .rev()
            .find(|i| i.phase != ToastPhase::Exiting)
            .map(|i| i.notification.id)
        {
            self.dismiss(id);
        }
    }

    /// Advances every toast; returns true when a redraw is needed.
    pub fn tick(&mut self, delta_ms: u64) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let before = self.items.len();
        let mut changed = false;
        for item in &mut self.items {
            item.phase_elapsed_ms = item.phase_elapsed_ms.saturating_add(delta_ms);
            match item.phase {
                ToastPhase::Entering if item.phase_elapsed_ms >= TRANSITION_MS => {
                    item.phase = ToastPhase::Visible;
                    item.phase_elapsed_ms = 0;
                    changed = true;
                }
                ToastPhase::Visible if item.phase_elapsed_ms >= self.duration_ms => {
                    item.phase = ToastPhase::Exiting;
                    item.phase_elapsed_ms = 0;
                    changed = true;
                }
                _ => {}
            }
        }
        self.items
            .retain(|i| !(i.phase == ToastPhase::Exiting && i.phase_elapsed_ms >= TRANSITION_MS));
        changed || self.items.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<u64> {
        self.items.iter().map(|i| i.notification.id).collect()
    }

    /// Screen rectangle of every visible toast, newest at the bottom.
    fn placements(&self, area: Rect) -> Vec<(&ToastItem, Rect)> {
        let width = TOAST_WIDTH.min(area.width);
        if width < 6 {
            return Vec::new();
        }
        let mut placed = Vec::new();
        let mut bottom = area.y + area.height;
        let start = self.items.len().saturating_sub(MAX_VISIBLE);
        for item in self.items[start..].iter().rev() {
            let text_width = usize::from(width.saturating_sub(4)).max(1);
            let lines = item
                .notification
                .message
                .chars()
                .count()
                .div_ceil(text_width)
                .max(1) as u16;
            let height = (lines + 2).clamp(3, 6);
            if bottom < area.y + height {
                break;
            }
            bottom -= height;
            let rect = Rect {
                x: area.x + area.width - width,
                y: bottom,
                width,
                height,
            };
            placed.push((item, rect));
        }
        placed
    }

    /// Id of the toast drawn under the pointer.
    pub fn hit(&self, area: Rect, column: u16, row: u16) -> Option<u64> {
        self.placements(area)
            .into_iter()
            .find(|(_, r)| {
                column >= r.x && column < r.x + r.width && row >= r.y && row < r.y + r.height
            })
            .map(|(item, _)| item.notification.id)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        for (item, rect) in self.placements(area) {
            let (accent, icon) = match item.notification.severity {
                Severity::Success => (theme.success, "✓"),
                Severity::Error => (theme.error, "✗"),
                Severity::Warning => (theme.warning, "!"),
            };
            let text_style = if item.phase == ToastPhase::Visible {
                Style::default().fg(theme.text)
            } else {
                Style::default().fg(theme.text_muted)
            };

            frame.render_widget(Clear, rect);
            let paragraph = Paragraph::new(Line::from(vec![
                Span::styled(format!("{icon} "), Style::default().fg(accent)),
                Span::styled(item.notification.message.clone(), text_style),
            ]))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(accent))
                    .style(Style::default().bg(theme.background_panel)),
            )
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, rect);
        }
    }
}

impl Default for ToastTray {
    fn default() -> Self {
        Self::new(promptlog_config::schema::DEFAULT_NOTIFICATION_DURATION_MS)
    }
}
