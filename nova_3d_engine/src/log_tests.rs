//! Unit tests for the logging system
//!
//! A capturing logger replaces the global one for the duration of each
//! test, so tests that touch the logger run serially.

use std::sync::{Arc, Mutex};
use serial_test::serial;
use crate::log::{self, LogEntry, LogSeverity, Logger};

/// Logger that records entries into a shared vector
struct CapturingLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(CapturingLogger { entries: entries.clone() });
    entries
}

#[test]
#[serial]
fn test_log_macro_routes_to_custom_logger() {
    let entries = install_capture();

    crate::engine_info!("nova3d::test", "hello {}", 42);

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Info);
    assert_eq!(captured[0].source, "nova3d::test");
    assert_eq!(captured[0].message, "hello 42");
    assert!(captured[0].file.is_none());
    drop(captured);

    log::reset_logger();
}

#[test]
#[serial]
fn test_error_macro_carries_file_and_line() {
    let entries = install_capture();

    crate::engine_error!("nova3d::test", "boom");

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.is_some());
    assert!(captured[0].line.is_some());
    drop(captured);

    log::reset_logger();
}

#[test]
#[serial]
fn test_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}
