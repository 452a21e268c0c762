//! Tracing/logging setup.

/// Initializes structured logging with environment-based filtering.
///
/// Set `RUST_LOG` to control verbosity:
/// - `RUST_LOG=info` - lifecycle events (created, updated, destroyed)
/// - `RUST_LOG=debug` - request paths and association resolution
/// - `RUST_LOG=restive=debug` - debug only for this crate
///
/// # Example
///
/// ```ignore
/// restive::setup_tracing();
/// tracing::info!("client ready");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
