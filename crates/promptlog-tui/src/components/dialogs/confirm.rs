use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tokio::sync::oneshot;

use crate::theme::Theme;

/// Yes/no prompt whose answer is sent back to the task that asked.
///
/// Cancel is focused when the dialog opens, so a stray Enter never deletes.
pub struct ConfirmDialog {
    message: String,
    confirm_focused: bool,
    reply: Option<oneshot::Sender<bool>>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self {
            message: String::new(),
            confirm_focused: false,
            reply: None,
        }
    }

    /// Opens the dialog. A question still open is answered "no" first.
    pub fn open(&mut self, message: &str, reply: oneshot::Sender<bool>) {
        self.answer(false);
        self.message = message.to_string();
        self.confirm_focused = false;
        self.reply = Some(reply);
    }

    pub fn is_open(&self) -> bool {
        self.reply.is_some()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn toggle_focus(&mut self) {
        self.confirm_focused = !self.confirm_focused;
    }

    pub fn handle_left(&mut self) {
        self.confirm_focused = false;
    }

    pub fn handle_right(&mut self) {
        self.confirm_focused = true;
    }

    /// Answers with the focused button.
    pub fn submit(&mut self) {
        let confirmed = self.confirm_focused;
        self.answer(confirmed);
    }

    pub fn answer(&mut self, confirmed: bool) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(confirmed);
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.is_open() {
            return;
        }

        let dialog_area = super::centered_rect(56, 8, area);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(Span::styled(
                " Confirm ",
                Style::default()
                    .fg(theme.warning)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.background_panel));

        let inner = super::dialog_inner(block.inner(dialog_area));
        frame.render_widget(block, dialog_area);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                self.message.as_str(),
                Style::default().fg(theme.text),
            )))
            .wrap(Wrap { trim: true })
            .centered(),
            Rect {
                x: inner.x,
                y: inner.y + 1,
                width: inner.width,
                height: inner.height.saturating_sub(3),
            },
        );

        let cancel_style = if self.confirm_focused {
            Style::default().fg(theme.text_muted)
        } else {
            Style::default().fg(theme.text).bg(theme.primary)
        };
        let confirm_style = if self.confirm_focused {
            Style::default().fg(theme.text).bg(theme.error)
        } else {
            Style::default().fg(theme.text_muted)
        };

        let buttons = Line::from(vec![
            Span::styled(" Cancel ", cancel_style),
            Span::raw("   "),
            Span::styled(" Confirm ", confirm_style),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).centered(),
            Rect {
                x: inner.x,
                y: inner.y + inner.height.saturating_sub(1),
                width: inner.width,
                height: 1,
            },
        );
    }
}

impl Default for ConfirmDialog {
    fn default() -> Self {
        Self::new()
    }
}
