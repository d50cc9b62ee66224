use promptlog_types::PromptEntry;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::context::edit::{PromptDraft, PromptField};
use crate::theme::Theme;
use crate::ui::layout::vertical_split;

/// Right-hand pane: the selected prompt, or its draft while editing.
pub struct PromptEditor;

impl PromptEditor {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        entry: Option<&PromptEntry>,
        draft: Option<&PromptDraft>,
        theme: &Theme,
        focused: bool,
    ) {
        let title = if draft.is_some() { " Editing " } else { " Prompt " };
        let block = Block::default()
            .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused || draft.is_some()))
            .style(Style::default().bg(theme.background));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(entry) = entry else {
            frame.render_widget(
                Paragraph::new(Span::styled("Select a prompt to view it.", theme.muted())),
                inner,
            );
            return;
        };

        let rows = vertical_split(
            inner,
            vec![
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ],
        );

        match draft {
            Some(draft) => Self::render_draft(frame, &rows, draft, theme),
            None => Self::render_entry(frame, &rows, entry, theme),
        }
    }

    fn field_line<'a>(label: &'a str, value: &'a str, active: bool, theme: &Theme) -> Line<'a> {
        let label_style = if active {
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            theme.muted()
        };
        let mut spans = vec![
            Span::styled(format!("{label:<6} "), label_style),
            Span::styled(value, Style::default().fg(theme.text)),
        ];
        if active {
            spans.push(Span::styled("▏", Style::default().fg(theme.primary)));
        }
        Line::from(spans)
    }

    fn render_entry(frame: &mut Frame, rows: &[Rect], entry: &PromptEntry, theme: &Theme) {
        let tags = entry
            .tags
            .as_ref()
            .map(|t| t.join(", "))
            .unwrap_or_default();
        let header = vec![
            Self::field_line("Title", entry.title.as_deref().unwrap_or(""), false, theme),
            Self::field_line("Model", entry.model.as_deref().unwrap_or(""), false, theme),
            Self::field_line("Tags", &tags, false, theme),
        ];
        frame.render_widget(Paragraph::new(header), rows[0]);

        let content = if entry.is_placeholder_content() {
            Paragraph::new(Span::styled("(empty)", theme.muted()))
        } else {
            Paragraph::new(entry.content.as_str())
                .style(Style::default().fg(theme.text))
                .wrap(Wrap { trim: false })
        };
        frame.render_widget(content, rows[1]);

        let stamp = match entry.updated_at {
            Some(updated) => format!("updated {}", updated.format("%Y-%m-%d %H:%M")),
            None => format!("created {}", entry.created_at.format("%Y-%m-%d %H:%M")),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("{stamp} · e edit · y copy · x delete"),
                theme.muted(),
            )),
            rows[2],
        );
    }

    fn render_draft(frame: &mut Frame, rows: &[Rect], draft: &PromptDraft, theme: &Theme) {
        let header = vec![
            Self::field_line("Title", &draft.title, draft.field == PromptField::Title, theme),
            Self::field_line("Model", &draft.model, draft.field == PromptField::Model, theme),
            Self::field_line("Tags", &draft.tags, draft.field == PromptField::Tags, theme),
        ];
        frame.render_widget(Paragraph::new(header), rows[0]);

        let mut content_lines: Vec<Line> = draft
            .content
            .split('\n')
            .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.text))))
            .collect();
        if draft.field == PromptField::Content {
            if let Some(last) = content_lines.last_mut() {
                last.spans
                    .push(Span::styled("▏", Style::default().fg(theme.primary)));
            }
        }
        let content_block = Block::default()
            .borders(Borders::TOP)
            .border_style(theme.border_style(draft.field == PromptField::Content));
        frame.render_widget(
            Paragraph::new(content_lines)
                .block(content_block)
                .wrap(Wrap { trim: false }),
            rows[1],
        );

        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(
                    "editing {} · Tab next field · Esc save · Ctrl+X discard",
                    draft.field.label()
                ),
                theme.muted(),
            )),
            rows[2],
        );
    }
}
