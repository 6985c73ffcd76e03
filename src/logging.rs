//! Logging bootstrap
//!
//! Installs a `tracing-subscriber` formatter writing to stderr. `RUST_LOG`
//! wins over the level passed in; a second call is a no-op.

use tracing_subscriber::EnvFilter;

use crate::error::{EduError, EduResult};

/// Initialize the global tracing subscriber
pub fn init_logging(level: &str) -> EduResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| EduError::Config(format!("Invalid log level '{}': {}", level, e)))?,
    };

    // Already installed by an earlier call (or by a test harness)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    Ok(())
}
