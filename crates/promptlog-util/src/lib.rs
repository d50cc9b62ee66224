pub mod debounce;
pub mod logging;

pub use debounce::Debouncer;
pub use logging::{init_tracing, LogLevel, LoggingGuard};
