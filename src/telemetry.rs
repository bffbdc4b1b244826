//! Tracing initialisation.
//!
//! Sets up tracing-subscriber with console output and an `EnvFilter` driven
//! by `RUST_LOG` (defaulting to `info`). Classified auth failures are logged
//! where they are turned into responses (see [`crate::errors`]); handler and
//! store spans come from `#[tracing::instrument]` annotations.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing for the binary.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
