//! Subscriber setup for binaries embedding the crate.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogLevel;
use crate::error::Result;

/// Install a global fmt subscriber at `level`.
///
/// `RUST_LOG` takes precedence over the configured level when set.
pub fn init_logging(level: &LogLevel) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_thread_names(true))
        .try_init()?;

    Ok(())
}
