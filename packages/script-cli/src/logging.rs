//! Logging setup for the CLI

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber; `RUST_LOG` overrides the default level
pub fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .try_init();
}
