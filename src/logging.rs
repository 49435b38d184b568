//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr, filtered by `RUST_LOG` when set.
///
/// Without `RUST_LOG` only warnings are shown, or everything from this crate
/// down to debug when `verbose` is set. Safe to call more than once.
pub fn init(verbose: bool) {
    let default_level = if verbose { "malote=debug,info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
