use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ChainError, Result};

/// Installs a global fmt subscriber. `RUST_LOG` wins over `default_directive`.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|err| ChainError::Config(format!("invalid log directive: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| ChainError::Config(format!("failed to install tracing subscriber: {err}")))
}
