//! Line sinks receiving text output one line at a time.

use tracing::info;

/// Anything that accepts lines of output.
pub trait LineSink {
    /// Consume one line, without its trailing newline.
    fn accept(&mut self, line: &str);
}

impl LineSink for Vec<String> {
    fn accept(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

impl<F: FnMut(&str)> LineSink for F {
    fn accept(&mut self, line: &str) {
        self(line);
    }
}

/// Forwards every line to the `tracing` log, tagged with a label.
#[derive(Debug, Clone)]
pub struct TracingSink {
    label: String,
}

impl TracingSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl LineSink for TracingSink {
    fn accept(&mut self, line: &str) {
        info!(target: "docfork::output", label = %self.label, "{line}");
    }
}
