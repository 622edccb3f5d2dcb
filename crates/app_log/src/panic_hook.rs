//! Panic hook for crash reporting

use backtrace::Backtrace;
use chrono::Local;
use std::panic::PanicHookInfo;
use std::path::PathBuf;

/// Initialize the panic hook for crash reporting
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook initialized");
}

fn panic_handler(info: &PanicHookInfo) {
    let thread = std::thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");

    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<unknown>".to_string());

    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "<unknown>".to_string());

    let report = crash_report(thread_name, &location, &payload, &Backtrace::new());

    // stderr is always available, tracing may not be
    eprintln!("{}", report);
    tracing::error!("{}", report);

    let dump_path = crash_dump_path();
    if let Err(e) = std::fs::write(&dump_path, &report) {
        eprintln!("Failed to write crash dump: {}", e);
    } else {
        eprintln!("Crash dump written to {}", dump_path.display());
    }
}

fn crash_report(thread: &str, location: &str, payload: &str, backtrace: &Backtrace) -> String {
    format!(
        "=== AZAMI READER PANIC ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {}\n\
         Payload: {}\n\n\
         Stack Trace:\n{:?}",
        Local::now().to_rfc3339(),
        thread,
        location,
        payload,
        backtrace
    )
}

fn crash_dump_path() -> PathBuf {
    let file_name = format!(
        "azami_reader_crash_{}.txt",
        Local::now().format("%Y%m%d_%H%M%S")
    );
    std::env::temp_dir().join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crash_report_contents() {
        let report = crash_report("main", "src/app.rs:10:5", "boom", &Backtrace::new_unresolved());
        assert!(report.contains("Thread: main"));
        assert!(report.contains("Location: src/app.rs:10:5"));
        assert!(report.contains("Payload: boom"));
    }

    #[test]
    fn test_crash_dump_in_temp_dir() {
        let path = crash_dump_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path.to_string_lossy().contains("azami_reader_crash_"));
    }
}
