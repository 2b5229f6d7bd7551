use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wires up tracing for a pipeline run: human-readable console output plus a
/// daily-rotated JSON log file under `logs/`.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "listwash.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG takes precedence when set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("listwash=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
        .init();

    // The guard must outlive the process or buffered lines are dropped
    std::mem::forget(guard);
}
