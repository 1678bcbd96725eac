use crate::error::{HopperError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber with the given filter directive.
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| HopperError::InvalidArgument(format!("Invalid log level: {e}")))?,
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| HopperError::InvalidArgument("Logging already initialized".into()))
}
