use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Keeps the background log writer alive; drop it last.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    pub log_path: Option<PathBuf>,
}

pub fn init_logging(logging: &LoggingConfig) -> Result<LoggingGuard> {
    let level = logging.level().unwrap_or(Level::WARN);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let (writer, guard, log_path) = match logging.log_file.as_ref() {
        Some(path) => {
            let file = open_log_file(path)?;
            let (writer, guard) = non_blocking::NonBlockingBuilder::default()
                .lossy(false)
                .finish(file);
            (writer, guard, Some(path.clone()))
        }
        None => {
            let (writer, guard) = non_blocking::NonBlockingBuilder::default()
                .lossy(false)
                .finish(std::io::stderr());
            (writer, guard, None)
        }
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::NONE)
        .with_writer(writer);

    // Ignore error if a global subscriber is already set (e.g., when running in tests)
    if logging.enable_structured {
        let subscriber = builder.json().with_current_span(false).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    } else {
        let subscriber = builder.with_target(true).with_ansi(false).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    Ok(LoggingGuard {
        _guard: guard,
        log_path,
    })
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory at {}", parent.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file at {}", path.display()))
}
