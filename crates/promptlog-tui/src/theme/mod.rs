use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub mode: ThemeMode,
    pub text: Color,
    pub text_muted: Color,
    pub background: Color,
    pub background_panel: Color,
    pub background_element: Color,
    pub border: Color,
    pub border_active: Color,
    pub primary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub highlight: Color,
}

impl Theme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            text: Color::Rgb(230, 230, 230),
            text_muted: Color::Rgb(128, 128, 128),
            background: Color::Reset,
            background_panel: Color::Rgb(30, 30, 30),
            background_element: Color::Rgb(45, 45, 45),
            border: Color::Rgb(80, 80, 80),
            border_active: Color::Rgb(100, 200, 255),
            primary: Color::Rgb(100, 200, 255),
            success: Color::Rgb(80, 200, 120),
            warning: Color::Rgb(255, 200, 80),
            error: Color::Rgb(255, 80, 80),
            info: Color::Rgb(100, 180, 255),
            highlight: Color::Rgb(120, 100, 20),
        }
    }

    pub fn light() -> Self {
        Self {
            mode: ThemeMode::Light,
            text: Color::Rgb(30, 30, 30),
            text_muted: Color::Rgb(120, 120, 120),
            background: Color::Rgb(255, 255, 255),
            background_panel: Color::Rgb(245, 245, 245),
            background_element: Color::Rgb(230, 230, 230),
            border: Color::Rgb(200, 200, 200),
            border_active: Color::Rgb(0, 120, 200),
            primary: Color::Rgb(0, 120, 200),
            success: Color::Rgb(30, 140, 60),
            warning: Color::Rgb(200, 130, 0),
            error: Color::Rgb(200, 40, 40),
            info: Color::Rgb(0, 110, 200),
            highlight: Color::Rgb(255, 230, 120),
        }
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.border_active } else { self.border })
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.text)
            .bg(self.background_element)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn match_style(&self) -> Style {
        Style::default()
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
