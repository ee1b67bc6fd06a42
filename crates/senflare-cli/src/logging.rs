//! Tracing subscriber setup.
//!
//! Logs go to stderr and, for full runs, to a plain-text log file as well.
//! `SENFLARE_LOG` takes an `EnvFilter` directive and overrides `--verbose`.

use std::env;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_subscriber::{EnvFilter, Registry};

/// Environment variable holding the filter directive
pub const LOG_ENV: &str = "SENFLARE_LOG";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// whole process.
pub fn init(verbose: bool, no_color: bool, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let registry = Registry::default().with(build_filter(verbose));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(verbose)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr);

    match log_file.and_then(build_file_writer) {
        Some((writer, guard)) => {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            let _ = registry.with(stderr_layer).with(file_layer).try_init();
            Some(guard)
        }
        None => {
            let _ = registry.with(stderr_layer).try_init();
            None
        }
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    match env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => EnvFilter::new(value),
        _ => {
            if verbose {
                EnvFilter::new("debug")
            } else {
                EnvFilter::new("info")
            }
        }
    }
}

fn build_file_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    let file_name = path.file_name()?.to_string_lossy().to_string();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if std::fs::create_dir_all(dir).is_err() {
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, file_name);
    Some(tracing_appender::non_blocking(appender))
}
