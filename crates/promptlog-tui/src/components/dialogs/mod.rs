use ratatui::layout::Rect;

mod confirm;
mod input;
mod settings;

const DIALOG_VIEWPORT_MARGIN_X: u16 = 2;
const DIALOG_VIEWPORT_MARGIN_Y: u16 = 1;
const DIALOG_INNER_PADDING_X: u16 = 1;

pub(super) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let viewport = inset_rect(area, DIALOG_VIEWPORT_MARGIN_X, DIALOG_VIEWPORT_MARGIN_Y);
    if viewport.width == 0 || viewport.height == 0 {
        return area;
    }

    let dialog_width = width.min(viewport.width).max(1);
    let dialog_height = height.min(viewport.height).max(1);

    Rect {
        x: viewport.x + viewport.width.saturating_sub(dialog_width) / 2,
        y: viewport.y + viewport.height.saturating_sub(dialog_height) / 2,
        width: dialog_width,
        height: dialog_height,
    }
}

pub(super) fn dialog_inner(area: Rect) -> Rect {
    inset_rect(area, DIALOG_INNER_PADDING_X, 0)
}

fn inset_rect(area: Rect, padding_x: u16, padding_y: u16) -> Rect {
    let twice_x = padding_x.saturating_mul(2);
    let twice_y = padding_y.saturating_mul(2);
    if area.width <= twice_x || area.height <= twice_y {
        return area;
    }

    Rect {
        x: area.x.saturating_add(padding_x),
        y: area.y.saturating_add(padding_y),
        width: area.width.saturating_sub(twice_x),
        height: area.height.saturating_sub(twice_y),
    }
}

pub use confirm::ConfirmDialog;
pub use input::{InputDialog, InputPurpose};
pub use settings::{SettingsAction, SettingsDialog};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_stays_inside_margins() {
        let area = Rect::new(0, 0, 30, 10);
        let r = centered_rect(100, 100, area);
        assert_eq!(r, Rect::new(2, 1, 26, 8));
    }
}
