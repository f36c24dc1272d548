use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix for the rolling log files under the data directory.
/// The appender suffixes each file with its date.
pub const LOG_FILE_PREFIX: &str = "reclaimarr.log";

/// Install the global subscriber: human-readable output on stderr plus a
/// daily-rolling plain file the `/api/logs` endpoint can tail.
///
/// The returned guard must stay alive for the lifetime of the process;
/// dropping it stops the background log writer.
pub fn init(data_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(data_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reclaimarr=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    guard
}
