use promptlog_types::{sort_prompts, PromptEntry, PromptId, PromptSort};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme::Theme;
use crate::ui::text::{single_line, truncate_to_width};

const ROW_HEIGHT: u16 = 2;

/// Ids in display order for the current sort mode.
pub fn ordered_ids(entries: &[PromptEntry], sort: PromptSort) -> Vec<PromptId> {
    sort_prompts(entries, sort).into_iter().map(|e| e.id).collect()
}

#[derive(Debug, Default)]
pub struct PromptListState {
    pub cursor: usize,
    scroll: usize,
    rows_area: Option<Rect>,
}

impl PromptListState {
    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = (self.cursor as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    pub fn follow(&mut self, ordered: &[PromptId], selected: Option<PromptId>) {
        if let Some(idx) = selected.and_then(|id| ordered.iter().position(|p| *p == id)) {
            self.cursor = idx;
        } else if self.cursor >= ordered.len() {
            self.cursor = ordered.len().saturating_sub(1);
        }
    }

    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.rows_area?;
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return None;
        }
        Some(self.scroll + usize::from((row - area.y) / ROW_HEIGHT))
    }
}

pub struct PromptList;

impl PromptList {
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        entries: Option<&[PromptEntry]>,
        sort: PromptSort,
        selected: Option<PromptId>,
        state: &mut PromptListState,
        theme: &Theme,
        focused: bool,
    ) {
        let block = Block::default()
            .title(Span::styled(
                format!(" Prompts · by {} ", sort.label()),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused))
            .style(Style::default().bg(theme.background_panel));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        state.rows_area = (inner.height > 0).then_some(inner);

        let Some(entries) = entries else {
            frame.render_widget(
                Paragraph::new(Span::styled("Select a task to see its prompts.", theme.muted())),
                inner,
            );
            return;
        };
        if entries.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("No prompts yet. Press a to add one.", theme.muted())),
                inner,
            );
            return;
        }

        let sorted = sort_prompts(entries, sort);
        let visible_rows = usize::from((inner.height / ROW_HEIGHT).max(1));
        if state.cursor < state.scroll {
            state.scroll = state.cursor;
        } else if state.cursor >= state.scroll + visible_rows {
            state.scroll = state.cursor + 1 - visible_rows;
        }

        let width = usize::from(inner.width);
        let mut lines = Vec::new();
        for (idx, entry) in sorted.iter().enumerate().skip(state.scroll).take(visible_rows) {
            let is_selected = selected == Some(entry.id);
            let mut title_style = if is_selected {
                theme.selected()
            } else {
                Style::default().fg(theme.text)
            };
            if focused && idx == state.cursor {
                title_style = title_style.add_modifier(Modifier::REVERSED);
            }

            let stamp = match sort {
                PromptSort::Created => entry.created_at,
                PromptSort::Modified => entry.last_modified(),
            };
            let mut meta = stamp.format("%Y-%m-%d %H:%M").to_string();
            if let Some(model) = entry.model.as_deref().filter(|m| !m.is_empty()) {
                meta.push_str(&format!(" · {model}"));
            }
            if let Some(tags) = entry.tags.as_ref().filter(|t| !t.is_empty()) {
                meta.push_str(&format!(" · #{}", tags.join(" #")));
            }
            if !entry.is_placeholder_content() && entry.title.is_some() {
                meta.push_str(&format!(" · {}", single_line(&entry.content)));
            }

            lines.push(Line::from(Span::styled(
                truncate_to_width(&entry.display_title(), width),
                title_style,
            )));
            lines.push(Line::from(Span::styled(
                truncate_to_width(&meta, width),
                theme.muted(),
            )));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
