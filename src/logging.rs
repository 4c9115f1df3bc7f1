//! Logging setup.
//!
//! Logs go to stderr so that anything printed on stdout stays machine-readable.
//! `RUST_LOG` wins when set; otherwise `--verbose` selects `debug`, else `info`.

use tracing_subscriber::EnvFilter;

pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("graph_series={default_level},warn")));

    // A subscriber may already be installed (tests, embedding); keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
