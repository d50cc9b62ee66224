use std::collections::HashSet;

use promptlog_types::{ProjectId, TaskId};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::context::store::{AppState, Selection};
use crate::theme::Theme;
use crate::ui::text::truncate_to_width;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeRow {
    Project {
        id: ProjectId,
        name: String,
        expanded: bool,
    },
    Task {
        id: TaskId,
        project_id: ProjectId,
        name: String,
    },
    /// Placeholder under an expanded project whose tasks are still loading.
    Loading { project_id: ProjectId },
}

impl TreeRow {
    pub fn project_id(&self) -> ProjectId {
        match self {
            TreeRow::Project { id, .. } => *id,
            TreeRow::Task { project_id, .. } | TreeRow::Loading { project_id } => *project_id,
        }
    }
}

/// Projects in backend order, each followed by its tasks when expanded.
/// Tasks are only reachable through their project, so orphans never show.
pub fn flatten(state: &AppState, expanded: &HashSet<ProjectId>) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    for project in &state.projects {
        let is_expanded = expanded.contains(&project.id);
        rows.push(TreeRow::Project {
            id: project.id,
            name: project.name.clone(),
            expanded: is_expanded,
        });
        if !is_expanded {
            continue;
        }
        if !state.has_tasks_loaded(project.id) {
            rows.push(TreeRow::Loading {
                project_id: project.id,
            });
            continue;
        }
        for task in state.tasks_for(project.id) {
            rows.push(TreeRow::Task {
                id: task.id,
                project_id: project.id,
                name: task.name.clone(),
            });
        }
    }
    rows
}

#[derive(Debug, Default)]
pub struct ProjectTreeState {
    pub cursor: usize,
    scroll: usize,
    rows_area: Option<Rect>,
}

impl ProjectTreeState {
    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    /// Keeps the cursor on the selected row after the tree changes shape.
    pub fn follow_selection(&mut self, rows: &[TreeRow], selection: &Selection) {
        let target = rows.iter().position(|row| match row {
            TreeRow::Task { id, .. } => selection.task == Some(*id),
            _ => false,
        });
        let target = target.or_else(|| {
            rows.iter().position(|row| {
                matches!(row, TreeRow::Project { id, .. } if selection.project == Some(*id))
            })
        });
        if let Some(idx) = target {
            self.cursor = idx;
        } else if self.cursor >= rows.len() {
            self.cursor = rows.len().saturating_sub(1);
        }
    }

    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.rows_area?;
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return None;
        }
        Some(self.scroll + usize::from(row - area.y))
    }
}

pub struct ProjectTree;

impl ProjectTree {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        rows: &[TreeRow],
        selection: &Selection,
        state: &mut ProjectTreeState,
        theme: &Theme,
        focused: bool,
    ) {
        let block = Block::default()
            .title(Span::styled(" Projects ", Style::default().add_modifier(Modifier::BOLD)))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused))
            .style(Style::default().bg(theme.background_panel));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            state.rows_area = None;
            return;
        }
        state.rows_area = Some(inner);

        if rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("No projects yet. Press n to create one.", theme.muted())),
                inner,
            );
            return;
        }

        let height = usize::from(inner.height);
        if state.cursor < state.scroll {
            state.scroll = state.cursor;
        } else if state.cursor >= state.scroll + height {
            state.scroll = state.cursor + 1 - height;
        }

        let width = usize::from(inner.width);
        let lines: Vec<Line> = rows
            .iter()
            .enumerate()
            .skip(state.scroll)
            .take(height)
            .map(|(idx, row)| {
                let (text, selected) = match row {
                    TreeRow::Project { id, name, expanded } => (
                        format!("{} {}", if *expanded { "▾" } else { "▸" }, name),
                        selection.project == Some(*id),
                    ),
                    TreeRow::Task { id, name, .. } => {
                        (format!("    {name}"), selection.task == Some(*id))
                    }
                    TreeRow::Loading { .. } => ("    loading…".to_string(), false),
                };
                let mut style = if selected {
                    theme.selected()
                } else if matches!(row, TreeRow::Loading { .. }) {
                    theme.muted()
                } else {
                    Style::default().fg(theme.text)
                };
                if focused && idx == state.cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                Line::from(Span::styled(truncate_to_width(&text, width), style))
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}
