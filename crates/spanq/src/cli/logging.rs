//! Log subscriber setup.

use std::io;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber filtered by `RUST_LOG`, raised by `-v` (debug) and `-vv` (trace).
pub fn init(verbose: u8) {
    let filter = EnvFilter::from_default_env();
    let filter = match verbose {
        0 => filter,
        1 => filter.add_directive(Level::DEBUG.into()),
        _ => filter.add_directive(Level::TRACE.into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
