//! Logging initialisation via tracing-subscriber.
//!
//! Call [`init`] once at startup. Output goes to stderr so it never mixes
//! with rendered results on stdout.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

/// Level used when neither `RUST_LOG` nor `--verbose` says otherwise.
pub const DEFAULT_LEVEL: &str = "warn";

/// Level used with `--verbose`.
pub const VERBOSE_LEVEL: &str = "vericv=debug";

/// Pick the fallback filter for the given verbosity.
pub fn level_for(verbose: bool) -> &'static str {
    if verbose { VERBOSE_LEVEL } else { DEFAULT_LEVEL }
}

/// Install the global subscriber. `RUST_LOG` takes precedence; `level` is
/// the fallback.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log level '{level}': {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {e}"))?;

    Ok(())
}
