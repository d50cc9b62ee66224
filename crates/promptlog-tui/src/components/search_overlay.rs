use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::search::{highlight, SearchOverlay};
use crate::theme::Theme;
use crate::ui::layout::centered;
use crate::ui::text::{single_line, truncate_to_width};

pub struct SearchOverlayView;

impl SearchOverlayView {
    pub fn render(frame: &mut Frame, area: Rect, overlay: &SearchOverlay, theme: &Theme) {
        let width = area.width.saturating_sub(8).min(90);
        let height = area.height.saturating_sub(4).min(24);
        let rect = centered(area, width, height);
        frame.render_widget(Clear, rect);

        let block = Block::default()
            .title(Span::styled(" Search ", Style::default().add_modifier(Modifier::BOLD)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border_active))
            .style(Style::default().bg(theme.background_panel));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        if inner.height < 3 {
            return;
        }

        let status = if overlay.is_searching() {
            "searching…".to_string()
        } else {
            format!("{} results", overlay.results().len())
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("› ", Style::default().fg(theme.primary)),
                Span::styled(overlay.input().to_string(), Style::default().fg(theme.text)),
                Span::styled("▏ ", Style::default().fg(theme.primary)),
                Span::styled(status, theme.muted()),
            ])),
            Rect { height: 1, ..inner },
        );

        let list_area = Rect {
            y: inner.y + 2,
            height: inner.height - 2,
            ..inner
        };
        let text_width = usize::from(list_area.width);
        let per_row = 2usize;
        let capacity = (usize::from(list_area.height) / per_row).max(1);
        let first = overlay
            .selected_index()
            .saturating_sub(capacity.saturating_sub(1));

        let mut lines = Vec::new();
        for (idx, result) in overlay
            .results()
            .iter()
            .enumerate()
            .skip(first)
            .take(capacity)
        {
            let selected = idx == overlay.selected_index();
            let crumb_style = if selected {
                theme.selected()
            } else {
                theme.muted()
            };
            lines.push(Line::from(Span::styled(
                truncate_to_width(
                    &format!(
                        "{} · {}",
                        result.breadcrumb(),
                        result.created_at.format("%Y-%m-%d")
                    ),
                    text_width,
                ),
                crumb_style,
            )));

            let snippet = truncate_to_width(&single_line(&result.snippet), text_width);
            let spans: Vec<Span> = highlight(&snippet, overlay.input())
                .into_iter()
                .map(|span| {
                    if span.matched {
                        Span::styled(span.text, theme.match_style().fg(theme.text))
                    } else {
                        Span::styled(span.text, Style::default().fg(theme.text))
                    }
                })
                .collect();
            lines.push(Line::from(spans));
        }
        frame.render_widget(Paragraph::new(lines), list_area);
    }
}
