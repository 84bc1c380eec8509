use crate::constants::LOG_FILE_NAME;
use crate::error::{CoverageError, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging with console output on stderr and a daily-rotated JSON file under `log_dir`.
///
/// Stdout is left to the report. The returned guard flushes the file writer
/// on drop and must be held until exit.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    let file_appender = open_log_file(log_dir)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stderr);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("spandex_coverage=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

fn open_log_file(log_dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(log_dir).map_err(|e| CoverageError::io(log_dir, e))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_dir)
        .map_err(|source| CoverageError::LogSetup {
            path: log_dir.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_dir_under_a_file_is_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let err = init_logging(&blocker.join("logs")).err().unwrap();
        assert!(matches!(err, CoverageError::Io { .. }));
    }

    #[test]
    fn test_log_file_is_opened_in_new_dir() {
        let dir = tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        open_log_file(&log_dir).unwrap();
        assert!(log_dir.is_dir());
    }
}
