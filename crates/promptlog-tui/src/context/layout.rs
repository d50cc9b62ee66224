#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Divider {
    Sidebar,
    PromptList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneBounds {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl PaneBounds {
    pub fn clamp(&self, width: i64) -> u32 {
        width.clamp(self.min as i64, self.max as i64) as u32
    }
}

pub const SIDEBAR_BOUNDS: PaneBounds = PaneBounds {
    min: 200,
    max: 400,
    default: 288,
};

pub const PROMPT_LIST_BOUNDS: PaneBounds = PaneBounds {
    min: 240,
    max: 500,
    default: 320,
};

impl Divider {
    pub fn bounds(self) -> PaneBounds {
        match self {
            Divider::Sidebar => SIDEBAR_BOUNDS,
            Divider::PromptList => PROMPT_LIST_BOUNDS,
        }
    }

    /// Key under which the width is persisted.
    pub fn storage_key(self) -> &'static str {
        match self {
            Divider::Sidebar => "sidebarWidth",
            Divider::PromptList => "promptListWidth",
        }
    }
}

/// Widths of the two resizable panes, in pixels, plus the drag state.
///
/// At most one divider is armed at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneLayout {
    pub sidebar_width: u32,
    pub prompt_list_width: u32,
    pub sidebar_open: bool,
    dragging: Option<Divider>,
}

impl Default for PaneLayout {
    fn default() -> Self {
        Self::new(SIDEBAR_BOUNDS.default, PROMPT_LIST_BOUNDS.default)
    }
}

impl PaneLayout {
    /// Restored widths are clamped so a hand-edited state file cannot push a
    /// pane outside its bounds.
    pub fn new(sidebar_width: u32, prompt_list_width: u32) -> Self {
        Self {
            sidebar_width: SIDEBAR_BOUNDS.clamp(sidebar_width as i64),
            prompt_list_width: PROMPT_LIST_BOUNDS.clamp(prompt_list_width as i64),
            sidebar_open: true,
            dragging: None,
        }
    }

    pub fn width(&self, divider: Divider) -> u32 {
        match divider {
            Divider::Sidebar => self.sidebar_width,
            Divider::PromptList => self.prompt_list_width,
        }
    }

    fn set_width(&mut self, divider: Divider, width: u32) {
        match divider {
            Divider::Sidebar => self.sidebar_width = width,
            Divider::PromptList => self.prompt_list_width = width,
        }
    }

    pub fn dragging(&self) -> Option<Divider> {
        self.dragging
    }

    /// Arms `divider`. Returns false when another drag is already in progress.
    pub fn pointer_down(&mut self, divider: Divider) -> bool {
        if self.dragging.is_some() {
            return false;
        }
        self.dragging = Some(divider);
        true
    }

    /// Recomputes the armed pane's width from the pointer's x position.
    pub fn pointer_move(&mut self, x: i64) -> Option<u32> {
        let divider = self.dragging?;
        let raw = match divider {
            Divider::Sidebar => x,
            Divider::PromptList if self.sidebar_open => x - self.sidebar_width as i64,
            Divider::PromptList => x,
        };
        let width = divider.bounds().clamp(raw);
        self.set_width(divider, width);
        Some(width)
    }

    /// Ends the drag and returns the width to persist.
    pub fn pointer_up(&mut self) -> Option<(Divider, u32)> {
        let divider = self.dragging.take()?;
        Some((divider, self.width(divider)))
    }

    pub fn double_click(&mut self, divider: Divider) -> u32 {
        let width = divider.bounds().default;
        self.set_width(divider, width);
        width
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }
}
