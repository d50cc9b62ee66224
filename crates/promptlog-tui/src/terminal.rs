use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::components::header::APP_NAME;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn init() -> io::Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

pub fn set_title(title: &str) -> io::Result<()> {
    execute!(io::stdout(), crossterm::terminal::SetTitle(title))
}

pub fn set_breadcrumb_title(breadcrumb: &str) -> io::Result<()> {
    if breadcrumb.is_empty() {
        set_title(APP_NAME)
    } else {
        set_title(&format!("{APP_NAME} - {breadcrumb}"))
    }
}
