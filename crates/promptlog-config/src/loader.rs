use crate::Config;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_GATEWAY_URL: &str = "PROMPTLOG_GATEWAY_URL";
pub const ENV_LOG_LEVEL: &str = "PROMPTLOG_LOG_LEVEL";
pub const ENV_CONFIG: &str = "PROMPTLOG_CONFIG";

/// Accumulates configuration layers, lowest priority first.
pub struct ConfigLoader {
    config: Config,
    config_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            config_paths: Vec::new(),
        }
    }

    pub fn load_from_str(&mut self, content: &str) -> Result<()> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse config content")?;
        self.config.merge(config);
        Ok(())
    }

    /// Missing files are skipped; unreadable or malformed ones are errors.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        tracing::debug!(path = %path.display(), "loaded config file");
        self.config.merge(config);
        self.config_paths.push(path.to_path_buf());
        Ok(())
    }

    pub fn load_global(&mut self) -> Result<()> {
        self.load_from_file(global_config_path())
    }

    pub fn load_from_env(&mut self) -> Result<()> {
        if let Ok(config_path) = env::var(ENV_CONFIG) {
            self.load_from_file(&config_path)?;
        }
        self.apply_env_overrides(|key| env::var(key).ok());
        Ok(())
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let mut overlay = Config::default();
        if let Some(url) = lookup(ENV_GATEWAY_URL).filter(|v| !v.trim().is_empty()) {
            overlay.gateway = Some(crate::GatewayConfig { url: Some(url) });
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            overlay.log = Some(crate::LogConfig {
                level: Some(level),
                dir: None,
            });
        }
        self.config.merge(overlay);
    }

    pub fn merge(&mut self, config: Config) {
        self.config.merge(config);
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn global_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("promptlog/config.toml")
}

/// Defaults, then the global file, then `explicit`, then the environment.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    loader.load_global()?;
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        loader.load_from_file(path)?;
    }
    loader.load_from_env()?;
    tracing::debug!(files = ?loader.config_paths(), "configuration loaded");
    Ok(loader.build())
}
