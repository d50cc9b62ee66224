use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;
mod commands;
mod tui;

use cli::*;
use promptlog_config::{load_config, Config, GatewayConfig, LogConfig};
use promptlog_tui::{Gateway, HttpGateway};
use promptlog_util::{init_tracing, LogLevel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.merge(cli_overrides(cli.url.clone(), cli.log_level.clone()));

    let command = cli.command.unwrap_or(Commands::Tui);
    // The TUI owns the terminal, so it logs to a file; everything else to stderr.
    let interactive = matches!(command, Commands::Tui);
    let logging = init_tracing(
        Some(LogLevel::parse(config.log_level())),
        config.log_dir().or_else(default_log_dir),
        !interactive,
    );

    let gateway: Arc<dyn Gateway> = Arc::new(HttpGateway::new(config.gateway_url())?);
    tracing::info!(url = config.gateway_url(), "promptlog starting");

    match command {
        Commands::Tui => tui::run_tui(config, gateway, logging.log_path.clone()).await?,
        Commands::Projects { format } => commands::list_projects(gateway, format).await?,
        Commands::Search {
            keyword,
            project,
            task,
            limit,
        } => commands::search(gateway, &config, &keyword, project, task, limit).await?,
        Commands::Export { path } => commands::export(gateway, &path).await?,
        Commands::Import { path, yes } => commands::import(gateway, &path, yes).await?,
        Commands::DbPath => commands::database_path(gateway).await?,
    }

    Ok(())
}

/// Flags win over every file and the environment.
fn cli_overrides(url: Option<String>, log_level: Option<String>) -> Config {
    Config {
        gateway: url.map(|url| GatewayConfig { url: Some(url) }),
        log: log_level.map(|level| LogConfig {
            level: Some(level),
            dir: None,
        }),
        ..Default::default()
    }
}

fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("promptlog").join("log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_loaded_config() {
        let mut loader = promptlog_config::ConfigLoader::new();
        loader
            .load_from_str(
                "[gateway]\nurl = \"http://file:1\"\n[log]\nlevel = \"warn\"\ndir = \"/var/log/promptlog\"\n",
            )
            .unwrap();
        let mut config = loader.build();
        config.merge(cli_overrides(Some("http://flag:2".into()), None));
        assert_eq!(config.gateway_url(), "http://flag:2");
        assert_eq!(config.log_level(), "warn");

        config.merge(cli_overrides(None, Some("debug".into())));
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_dir(), Some(PathBuf::from("/var/log/promptlog")));
    }
}
