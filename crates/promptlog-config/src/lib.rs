pub mod loader;
pub mod schema;

pub use loader::{global_config_path, load_config, ConfigLoader};
pub use schema::{Config, GatewayConfig, LogConfig, NotificationConfig, SearchConfig};
