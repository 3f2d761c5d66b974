use tracing_subscriber::EnvFilter;

/// Initialize tracing for a host app and bridge `log` to `tracing`, so the
/// `log` macros used throughout the crate are captured.
///
/// Entirely optional: hosts with their own subscriber can skip this. Safe to
/// call multiple times (subsequent attempts are ignored where possible).
pub fn init_tracing(enable_debug: bool) {
    let _ = tracing_log::LogTracer::init();

    // Prefer the explicit debug flag, otherwise RUST_LOG, otherwise warn
    let env_filter = if enable_debug {
        EnvFilter::new("zoomview=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // try_init so a host (or test) that already installed a subscriber wins
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_names(false)
        .try_init()
        .ok();
}
