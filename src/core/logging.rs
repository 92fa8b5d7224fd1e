//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g.
/// `RUST_LOG=rktri_grow=debug` for per-tick growth summaries.
///
/// # Example
/// ```
/// rktri_grow::core::logging::init();
/// log::info!("Growth host started");
/// ```
pub fn init() {
    // try_init so tests and binaries can both call this without panicking
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
