use promptlog_types::{ProjectId, TaskId};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::theme::Theme;
use crate::ui::text::truncate_to_width;

/// What the entered text will be used for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    NewProject,
    NewTask(ProjectId),
    RenameProject(ProjectId),
    RenameTask(TaskId),
    ExportPath,
    ImportPath,
}

impl InputPurpose {
    pub fn title(&self) -> &'static str {
        match self {
            InputPurpose::NewProject => "New project",
            InputPurpose::NewTask(_) => "New task",
            InputPurpose::RenameProject(_) => "Rename project",
            InputPurpose::RenameTask(_) => "Rename task",
            InputPurpose::ExportPath => "Export to file",
            InputPurpose::ImportPath => "Import from file",
        }
    }
}

/// Single-line text prompt.
pub struct InputDialog {
    purpose: Option<InputPurpose>,
    value: String,
}

impl InputDialog {
    pub fn new() -> Self {
        Self {
            purpose: None,
            value: String::new(),
        }
    }

    pub fn open(&mut self, purpose: InputPurpose, initial: &str) {
        self.purpose = Some(purpose);
        self.value = initial.to_string();
    }

    pub fn is_open(&self) -> bool {
        self.purpose.is_some()
    }

    pub fn purpose(&self) -> Option<&InputPurpose> {
        self.purpose.as_ref()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }

    pub fn close(&mut self) {
        self.purpose = None;
        self.value.clear();
    }

    /// Closes and returns what was typed. Validation is left to the caller.
    pub fn submit(&mut self) -> Option<(InputPurpose, String)> {
        let purpose = self.purpose.take()?;
        Some((purpose, std::mem::take(&mut self.value)))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(purpose) = &self.purpose else {
            return;
        };
        let dialog_area = super::centered_rect(60, 5, area);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", purpose.title()),
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_active))
            .style(Style::default().bg(theme.background_panel));
        let inner = super::dialog_inner(block.inner(dialog_area));
        frame.render_widget(block, dialog_area);

        let visible = truncate_to_width(&self.value, usize::from(inner.width.saturating_sub(2)));
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(visible, Style::default().fg(theme.text)),
                Span::styled("▏", Style::default().fg(theme.primary)),
            ])),
            Rect { height: 1, ..inner },
        );
        frame.render_widget(
            Paragraph::new(Span::styled("Enter to confirm · Esc to cancel", theme.muted())),
            Rect {
                y: inner.y + inner.height.saturating_sub(1),
                height: 1,
                ..inner
            },
        );
    }
}

impl Default for InputDialog {
    fn default() -> Self {
        Self::new()
    }
}
