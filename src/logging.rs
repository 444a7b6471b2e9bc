// Logging bootstrap for host binaries and tests
// The library itself only emits tracing events

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber honoring RUST_LOG (default: info).
/// Calling it twice is harmless - the second install is ignored.
pub fn initLogging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
