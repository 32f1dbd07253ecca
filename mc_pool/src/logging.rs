//! tracing subscriber setup shared by both binaries.

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Error, Result};

/// Installs a fmt subscriber writing to stderr, filtered by `level`.
///
/// `level` is any `EnvFilter` directive, e.g. `info` or `mc_pool=debug`.
/// Stdout stays reserved for the result dump.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).map_err(|e| Error::Logging(e.to_string()))?;

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
