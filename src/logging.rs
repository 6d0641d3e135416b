use std::path::PathBuf;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Keeps the file writer flushing for the life of the process.
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Initialise logging. With `debug` the default level is `debug` and the
/// `RUST_LOG` environment variable may override it; otherwise `info` is
/// forced. When `file` is given, output is appended to that file instead of
/// stdout. Calling this more than once keeps the first subscriber.
pub fn init(debug: bool, file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let Some(path) = file else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        return;
    };

    let dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let Some(name) = path.file_name() else {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        tracing::warn!("log file path {} has no file name; logging to stdout", path.display());
        return;
    };

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .is_ok();
    if installed {
        if let Ok(mut slot) = FILE_GUARD.lock() {
            *slot = Some(guard);
        }
    }
}
