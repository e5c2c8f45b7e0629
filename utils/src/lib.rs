use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Directory the rolling log files are written to.
pub const LOG_DIR: &str = "./logs";

/// Installs the global subscriber: stdout plus a daily rolling file under
/// [`LOG_DIR`] named after `file_prefix`. `RUST_LOG` controls the filter and
/// falls back to `info` when unset.
///
/// Keep the returned guard alive in `main`, dropping it flushes the file writer.
pub fn init_tracing(file_prefix: &str) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = rolling::daily(LOG_DIR, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The replay binary prints its own lines to stdout, so logs go to stderr.
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // No ANSI escapes in the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// Anything stamped with the harness clock.
pub trait Timestamped {
    fn get_ts(&self) -> i64;
}

/// Keeps the items stamped at exactly `ts`, in their original order.
pub fn stamped_at<T: Timestamped>(items: &[T], ts: i64) -> impl Iterator<Item = &T> {
    items.iter().filter(move |item| item.get_ts() == ts)
}
