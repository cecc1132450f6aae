/// Sink for per-chunk info lines and soft-validation warnings. The parse
/// paths report through this instead of printing directly, so the structure
/// code stays a pure function of its input bytes.
pub trait Report {
    fn info(&mut self, msg: &str);
    fn warn(&mut self, msg: &str);
}

/// Prints to stdout for CLI runs.
pub struct ConsoleReport;

impl Report for ConsoleReport {
    fn info(&mut self, msg: &str) {
        println!("[i] {}", msg);
    }

    fn warn(&mut self, msg: &str) {
        println!("[!] {}", msg);
    }
}

/// Discards everything. Used by tests that only care about parse results.
pub struct SilentReport;

impl Report for SilentReport {
    fn info(&mut self, _msg: &str) {}
    fn warn(&mut self, _msg: &str) {}
}
