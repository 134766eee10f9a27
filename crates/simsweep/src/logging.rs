use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// Stderr keeps log lines out of anything piped from stdout; the result
/// table itself goes to disk, never through the logger. The level can be
/// set via the `--log-level` flag or overridden with `RUST_LOG`.
pub fn init_logging(level: &str) {
    let default_filter = format!("simsweep={level},simsweep_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();
}
