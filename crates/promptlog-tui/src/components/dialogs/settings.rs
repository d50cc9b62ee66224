use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Export,
    Import,
}

const ACTIONS: [SettingsAction; 2] = [SettingsAction::Export, SettingsAction::Import];

/// Database location plus the backup actions.
pub struct SettingsDialog {
    open: bool,
    db_path: Option<String>,
    selected: usize,
}

impl SettingsDialog {
    pub fn new() -> Self {
        Self {
            open: false,
            db_path: None,
            selected: 0,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_db_path(&mut self, path: Option<String>) {
        self.db_path = path;
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = ACTIONS.len() as isize;
        self.selected = (self.selected as isize + delta).rem_euclid(len) as usize;
    }

    pub fn selected_action(&self) -> SettingsAction {
        ACTIONS[self.selected]
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.open {
            return;
        }
        let dialog_area = super::centered_rect(70, 12, area);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(Span::styled(
                " Settings ",
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.background_panel));
        let inner = super::dialog_inner(block.inner(dialog_area));
        frame.render_widget(block, dialog_area);

        let path = self.db_path.as_deref().unwrap_or("loading…");
        let mut lines = vec![
            Line::from(Span::styled(
                "Database",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(path.to_string(), Style::default().fg(theme.text))),
            Line::from(""),
            Line::from(Span::styled(
                "Backup",
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];
        for (idx, action) in ACTIONS.iter().enumerate() {
            let label = match action {
                SettingsAction::Export => "Export data to a JSON file",
                SettingsAction::Import => "Import data from a JSON file (replaces everything)",
            };
            let style = if idx == self.selected {
                theme.selected()
            } else {
                Style::default().fg(theme.text)
            };
            let marker = if idx == self.selected { "› " } else { "  " };
            lines.push(Line::from(Span::styled(format!("{marker}{label}"), style)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "↑/↓ select · Enter run · Esc close",
            theme.muted(),
        )));

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

impl Default for SettingsDialog {
    fn default() -> Self {
        Self::new()
    }
}
