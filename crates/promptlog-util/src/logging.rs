use chrono::Local;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "DEBUG" | "TRACE" => LogLevel::Debug,
            "WARN" | "WARNING" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_filter().to_uppercase())
    }
}

/// Keeps the non-blocking file writer alive. Dropping it flushes pending
/// lines and stops file logging.
pub struct LoggingGuard {
    pub log_path: Option<PathBuf>,
    _worker: Option<WorkerGuard>,
}

fn filter_for(level: Option<LogLevel>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(LogLevel::Info).as_filter()))
}

/// Installs the global tracing subscriber.
///
/// With `print` set, logs go to stderr. Otherwise they go to a timestamped
/// file under `log_dir`, which keeps the terminal free for the TUI. If the
/// file cannot be opened, logging is disabled rather than written over the UI.
pub fn init_tracing(level: Option<LogLevel>, log_dir: Option<PathBuf>, print: bool) -> LoggingGuard {
    if print {
        let _ = tracing_subscriber::registry()
            .with(filter_for(level))
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
        return LoggingGuard {
            log_path: None,
            _worker: None,
        };
    }

    let log_dir = log_dir.unwrap_or_else(|| PathBuf::from("."));
    let timestamp = Local::now().format("%Y-%m-%dT%H%M%S").to_string();
    let log_path = log_dir.join(format!("{}.log", timestamp));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&log_path)
        .ok();

    let Some(file) = file else {
        return LoggingGuard {
            log_path: None,
            _worker: None,
        };
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = tracing_subscriber::registry()
        .with(filter_for(level))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init();

    LoggingGuard {
        log_path: Some(log_path),
        _worker: Some(guard),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parse_defaults_to_info() {
        assert_eq!(LogLevel::parse("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::parse("Warning"), LogLevel::Warn);
        assert_eq!(LogLevel::parse("nonsense"), LogLevel::Info);
        assert_eq!(LogLevel::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_file_logging_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init_tracing(Some(LogLevel::Debug), Some(dir.path().join("logs")), false);
        let path = guard.log_path.clone().unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("log"));
    }
}
