use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber.
///
/// `filter` uses `EnvFilter` directive syntax, e.g. `info` or
/// `signed_identity=debug,tower=warn`.
pub fn init_tracing(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(filter)
        .with_context(|| format!("parsing log filter {filter:?}"))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}
