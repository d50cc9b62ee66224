pub mod api;
pub mod app;
pub mod components;
pub mod context;
pub mod controller;
pub mod event;
pub mod search;
pub mod terminal;
pub mod theme;
pub mod ui;

use std::sync::Arc;

pub use api::{Gateway, GatewayError, HttpGateway};
pub use app::App;
pub use context::{Action, AppState, Store};
pub use controller::{AssumeYes, Confirmer, Controller};
pub use event::Event;
pub use search::SearchOverlay;
pub use terminal::set_title;
pub use theme::{Theme, ThemeMode};

fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::event::DisableMouseCapture,
        );
        eprintln!("\n\nPANIC: {}", panic_info);
    }));
}

/// Runs the interactive client until the user quits. Blocks the calling
/// thread; backend calls are spawned on `runtime`.
pub fn run_tui(
    config: &promptlog_config::Config,
    gateway: Arc<dyn Gateway>,
    runtime: tokio::runtime::Handle,
) -> anyhow::Result<()> {
    setup_panic_hook();

    let mut app = App::new(config, gateway, runtime)?;
    app.run()
}
