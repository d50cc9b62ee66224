use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::context::layout::PaneLayout;

/// Pixel width of one terminal column when mapping pane widths to cells.
pub const CELL_PX: u32 = 8;

pub fn px_to_cols(px: u32) -> u16 {
    (px / CELL_PX).min(u16::MAX as u32) as u16
}

pub fn col_to_px(col: u16) -> i64 {
    col as i64 * CELL_PX as i64
}

pub fn vertical_split(area: Rect, constraints: Vec<Constraint>) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Areas of the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panes {
    pub header: Rect,
    pub sidebar: Option<Rect>,
    pub prompt_list: Rect,
    pub editor: Rect,
    pub footer: Rect,
}

impl Panes {
    /// Column just right of the sidebar, where its divider is grabbed.
    pub fn sidebar_divider_col(&self) -> Option<u16> {
        self.sidebar.map(|r| r.x + r.width.saturating_sub(1))
    }

    pub fn prompt_list_divider_col(&self) -> u16 {
        self.prompt_list.x + self.prompt_list.width.saturating_sub(1)
    }
}

pub fn panes(area: Rect, layout: &PaneLayout) -> Panes {
    let rows = vertical_split(
        area,
        vec![
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ],
    );
    let body = rows[1];

    let sidebar_cols = if layout.sidebar_open {
        px_to_cols(layout.sidebar_width)
    } else {
        0
    };
    let list_cols = px_to_cols(layout.prompt_list_width);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(sidebar_cols),
            Constraint::Length(list_cols),
            Constraint::Min(10),
        ])
        .split(body);

    Panes {
        header: rows[0],
        sidebar: layout.sidebar_open.then_some(columns[0]),
        prompt_list: columns[1],
        editor: columns[2],
        footer: rows[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_widths_map_to_columns() {
        let layout = PaneLayout::default();
        let panes = panes(Rect::new(0, 0, 200, 50), &layout);
        assert_eq!(panes.sidebar.map(|r| r.width), Some(36));
        assert_eq!(panes.prompt_list.width, 40);
        assert_eq!(panes.prompt_list.x, 36);
        assert_eq!(panes.header.height, 3);
    }

    #[test]
    fn test_closed_sidebar_has_no_area() {
        let mut layout = PaneLayout::default();
        layout.toggle_sidebar();
        let panes = panes(Rect::new(0, 0, 200, 50), &layout);
        assert!(panes.sidebar.is_none());
        assert_eq!(panes.prompt_list.x, 0);
    }

    #[test]
    fn test_centered_fits_inside_area() {
        let r = centered(Rect::new(0, 0, 20, 10), 40, 4);
        assert_eq!(r, Rect::new(0, 3, 20, 4));
    }
}
