//! Structured logging setup with tracing

use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Keeps the non-blocking file writer alive
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Initialize the logging system
pub fn init_logging() -> anyhow::Result<LogGuard> {
    let log_dir = super::log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "azami.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(debug_assertions)]
    {
        // Development: pretty console output + file
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        // Release: JSON file only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init()?;
    }

    tracing::info!(dir = %log_dir.display(), "Logging initialized");
    Ok(LogGuard { _file: guard })
}

/// Clean up log files in the application log directory older than `days`
pub fn cleanup_old_logs(days: u32) -> anyhow::Result<usize> {
    cleanup_logs_in(&super::log_dir(), days)
}

/// Clean up `*.log*` files in `dir` whose modification time is older than `days`
pub fn cleanup_logs_in(dir: &Path, days: u32) -> anyhow::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let threshold = SystemTime::now() - Duration::from_secs(days as u64 * 24 * 60 * 60);
    let mut deleted = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        // Rolling appender names files "azami.log.YYYY-MM-DD"
        let is_log = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.contains(".log"));
        if !is_log {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        if let Ok(modified) = modified {
            if modified < threshold && std::fs::remove_file(&path).is_ok() {
                deleted += 1;
                tracing::debug!("Deleted old log: {:?}", path);
            }
        }
    }

    tracing::info!("Cleaned up {} old log files", deleted);
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_keeps_recent_logs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("azami.log.2026-10-19"), b"{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();

        let deleted = cleanup_logs_in(dir.path(), 7).unwrap();
        assert_eq!(deleted, 0);
        assert!(dir.path().join("azami.log.2026-10-19").exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(cleanup_logs_in(&missing, 7).unwrap(), 0);
    }
}
