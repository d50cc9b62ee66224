use std::path::PathBuf;
use std::sync::Arc;

use promptlog_config::Config;
use promptlog_tui::Gateway;

pub(crate) async fn run_tui(
    config: Config,
    gateway: Arc<dyn Gateway>,
    log_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Handle::current();
    let run_result =
        tokio::task::spawn_blocking(move || promptlog_tui::run_tui(&config, gateway, runtime))
            .await
            .map_err(|e| anyhow::anyhow!("TUI task panicked: {}", e))?;

    if run_result.is_err() {
        if let Some(path) = log_path {
            eprintln!("See {} for details.", path.display());
        }
    }
    run_result
}
