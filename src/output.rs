//! User-facing output.
//!
//! Success notifications, target lists and the machine-readable debug line
//! go through an [`OutputSink`] so they never mix with log formatting.

use std::io::Write;
use std::sync::Mutex;

/// Destination for user-facing lines.
pub trait OutputSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Writes each line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn line(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        // A closed stdout is not worth failing a run over
        let _ = writeln!(handle, "{}", line);
    }
}

/// Collects lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl OutputSink for MemorySink {
    fn line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Machine-readable record announcing the web debug proxy port.
#[derive(Debug, Clone, Copy)]
pub struct DebugProxyLine {
    pub web_debug_proxy_port: u16,
}

impl DebugProxyLine {
    /// Render as a single JSON line, e.g. `{"webDebugProxyPort":9221}`.
    pub fn render(&self) -> String {
        serde_json::json!({ "webDebugProxyPort": self.web_debug_proxy_port }).to_string()
    }
}
