//! File-based diagnostics. The TUI owns stdout/stderr, so failures are
//! appended under `.rolehub-ai/errors/` instead of being printed.

use std::fs;
use std::path::PathBuf;

use chrono::Local;

/// Store directory for logs
pub const STORE_DIR: &str = ".rolehub-ai";

/// Subdirectory for error reports
const ERRORS_DIR: &str = "errors";

/// Write an error report to a numbered file and return its path for display.
pub fn log_error(error: &str) -> String {
    let errors_dir = PathBuf::from(STORE_DIR).join(ERRORS_DIR);
    fs::create_dir_all(&errors_dir).ok();

    let error_count = fs::read_dir(&errors_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().map(|ext| ext == "txt").unwrap_or(false))
                .count()
        })
        .unwrap_or(0);

    let filename = format!("error_{}.txt", error_count + 1);
    let filepath = errors_dir.join(&filename);

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    let content = format!("Timestamp: {}\n\n{}\n", timestamp, error);
    fs::write(&filepath, content).ok();

    filepath.display().to_string()
}

/// Append panic info to a persistent panic log.
pub fn log_panic(info: &std::panic::PanicHookInfo<'_>) {
    let error_dir = PathBuf::from(STORE_DIR).join(ERRORS_DIR);
    let _ = fs::create_dir_all(&error_dir);
    let ts = Local::now().format("%Y-%m-%d %H:%M:%S");
    let backtrace = std::backtrace::Backtrace::force_capture();
    let msg = format!("[{}] {}\n\n{}\n\n---\n", ts, info, backtrace);
    let log_path = error_dir.join("panic.log");
    let _ = fs::OpenOptions::new().create(true).append(true).open(&log_path).and_then(|mut f| {
        use std::io::Write;
        f.write_all(msg.as_bytes())
    });
}
