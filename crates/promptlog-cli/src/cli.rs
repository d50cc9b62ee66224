use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptlog")]
#[command(about = "PromptLog - organize prompts by project and task", long_about = None)]
pub(crate) struct Cli {
    #[arg(long, global = true, help = "Backend base URL")]
    pub(crate) url: Option<String>,
    #[arg(long, global = true, help = "Extra config file layered over the global one")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long = "log-level", global = true)]
    pub(crate) log_level: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    #[command(about = "Start the interactive client (default)")]
    Tui,
    #[command(about = "List projects")]
    Projects {
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    #[command(about = "Full-text search over prompt entries")]
    Search {
        #[arg(value_name = "KEYWORD")]
        keyword: String,
        #[arg(long)]
        project: Option<i64>,
        #[arg(long)]
        task: Option<i64>,
        #[arg(long)]
        limit: Option<u32>,
    },
    #[command(about = "Write a backup of all data to PATH")]
    Export {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    #[command(about = "Replace all data with the backup at PATH")]
    Import {
        #[arg(value_name = "PATH")]
        path: PathBuf,
        #[arg(short = 'y', long, default_value_t = false)]
        yes: bool,
    },
    #[command(name = "db-path", about = "Print the backend database location")]
    DbPath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["promptlog"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "promptlog",
            "search",
            "intro",
            "--limit",
            "5",
            "--url",
            "http://localhost:9000",
        ])
        .unwrap();
        assert_eq!(cli.url.as_deref(), Some("http://localhost:9000"));
        match cli.command {
            Some(Commands::Search { keyword, limit, project, .. }) => {
                assert_eq!(keyword, "intro");
                assert_eq!(limit, Some(5));
                assert_eq!(project, None);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_import_yes_flag() {
        let cli = Cli::try_parse_from(["promptlog", "import", "backup.json", "-y"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Import { yes: true, .. })));
    }
}
