//! Telemetry initialization (fmt subscriber with env-filter support).
//!
//! Log verbosity follows `RUST_LOG` when set, e.g.
//!
//! ```bash
//! RUST_LOG=previewctl=debug,tower_http=debug previewctl serve
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing with console output.
///
/// Defaults to `info` when `RUST_LOG` is unset.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
