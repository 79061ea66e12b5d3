#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod replay;

pub use cli::{Cli, Commands, run, run_from_env};
pub use error::{ReplayError, Result};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `NORIA_LOG=noria_client=trace`.
pub const LOG_ENV: &str = "NORIA_LOG";

/// Install a stderr `fmt` subscriber filtered by [`LOG_ENV`], `warn` when unset.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
