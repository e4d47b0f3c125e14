use std::io;
use std::path::Path;

use tracing::dispatcher::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::{fmt, registry};

use crate::relocation::error::RelocationError;

pub const LOG_FILE: &str = "logfile.log";
pub const WARNINGS_LOG_FILE: &str = "logfileWarningsErrors.log";

// This is a helper struct to store the logger guards. When they are dropped, the log files are
// flushed and logging is reset.
#[allow(dead_code)]
pub struct LogGuards {
    log_guard: WorkerGuard,
    warn_guard: WorkerGuard,
    default: DefaultGuard,
}

pub fn init_std_out_logging_thread_local() -> DefaultGuard {
    let collector = tracing_subscriber::registry().with(
        fmt::Layer::new()
            .with_writer(io::stdout)
            .with_filter(LevelFilter::INFO),
    );
    tracing::subscriber::set_default(collector)
}

/// Logs to stdout and into two files in `dir`: everything from INFO on, and warnings and errors
/// only.
pub fn init_logging(dir: &Path) -> Result<LogGuards, RelocationError> {
    let (log_file, log_guard) = non_blocking(file_appender(dir, LOG_FILE)?);
    let log_layer = fmt::Layer::new()
        .with_writer(log_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let (warn_file, warn_guard) = non_blocking(file_appender(dir, WARNINGS_LOG_FILE)?);
    let warn_layer = fmt::Layer::new()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let console_layer = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(LevelFilter::INFO);

    let collector = registry()
        .with(log_layer)
        .with(warn_layer)
        .with(console_layer);

    let default = tracing::subscriber::set_default(collector);

    Ok(LogGuards {
        log_guard,
        warn_guard,
        default,
    })
}

fn file_appender(dir: &Path, file_name: &str) -> Result<rolling::RollingFileAppender, RelocationError> {
    Builder::new()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)
        .map_err(|e| RelocationError::Logging {
            path: dir.join(file_name),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use tracing::{info, warn};

    use crate::relocation::logging::{init_logging, LOG_FILE, WARNINGS_LOG_FILE};

    #[test]
    fn warnings_go_to_both_files() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _guards = init_logging(dir.path()).unwrap();
            info!("loaded zones");
            warn!("no zone found for facility 1");
        }

        let all = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        let warnings = std::fs::read_to_string(dir.path().join(WARNINGS_LOG_FILE)).unwrap();
        assert!(all.contains("loaded zones"));
        assert!(all.contains("no zone found for facility 1"));
        assert!(!warnings.contains("loaded zones"));
        assert!(warnings.contains("no zone found for facility 1"));
    }
}
