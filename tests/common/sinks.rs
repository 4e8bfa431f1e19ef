use parking_lot::Mutex;
use std::sync::Arc;

use autofulfill_core::notification::MessageSink;

/// Observer that keeps every delivered line for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    name: String,
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            lines: Mutex::new(Vec::new()),
        })
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines.lock().iter().filter(|l| l.contains(needle)).count()
    }
}

impl MessageSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn deliver(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
