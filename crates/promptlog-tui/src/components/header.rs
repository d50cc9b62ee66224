use promptlog_types::PromptSort;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme::{Theme, ThemeMode};

pub const APP_NAME: &str = "PromptLog";

pub struct Header;

impl Header {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        breadcrumb: &str,
        sort: PromptSort,
        theme: &Theme,
        loading: bool,
    ) {
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.background_panel));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mode = match theme.mode {
            ThemeMode::Dark => "☾ dark",
            ThemeMode::Light => "☀ light",
        };
        let mut spans = vec![
            Span::styled(
                format!(" {APP_NAME} "),
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(breadcrumb.to_string(), Style::default().fg(theme.text)),
            Span::raw("  "),
            Span::styled(format!("[Ctrl+K search] [{mode}] [sort: {}]", sort.label()), theme.muted()),
        ];
        if loading {
            spans.push(Span::styled("  working…", Style::default().fg(theme.warning)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), inner);
    }
}
