//! Azami Reader logging & crash reporting
//!
//! Structured logging to console and rolling JSON files, a panic hook that
//! writes crash dumps, and a deadlock detector for debug builds.

mod panic_hook;
mod logging;

pub use panic_hook::init_panic_hook;
pub use logging::{init_logging, cleanup_old_logs, cleanup_logs_in, LogGuard};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application identifiers used for per-user directories
pub const QUALIFIER: &str = "com";
pub const ORGANIZATION: &str = "AzamiReader";
pub const APPLICATION: &str = "AzamiReader";

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize all observability features.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// until the event loop exits.
pub fn init() -> anyhow::Result<LogGuard> {
    let guard = init_logging()?;
    init_panic_hook();

    #[cfg(debug_assertions)]
    init_deadlock_detector();

    Ok(guard)
}

#[cfg(debug_assertions)]
fn init_deadlock_detector() {
    use std::thread;
    use std::time::Duration;

    let spawned = thread::Builder::new()
        .name("deadlock-detector".into())
        .spawn(|| loop {
            thread::sleep(Duration::from_secs(10));
            let deadlocks = parking_lot::deadlock::check_deadlock();
            if deadlocks.is_empty() {
                continue;
            }
            tracing::error!(count = deadlocks.len(), "Deadlock detected");
            for (i, threads) in deadlocks.iter().enumerate() {
                for t in threads {
                    tracing::error!(
                        deadlock = i,
                        thread_id = ?t.thread_id(),
                        backtrace = ?t.backtrace(),
                        "Deadlocked thread"
                    );
                }
            }
        });

    if let Err(e) = spawned {
        tracing::warn!("Failed to start deadlock detector: {}", e);
    }
}
