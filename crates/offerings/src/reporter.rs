//! Diagnostics sink passed explicitly to every operation.
//!
//! Operations never write to the global logger directly. Binaries hand them a
//! [`LogReporter`], which forwards to the [`log`] facade; tests use a
//! [`MemoryReporter`] and inspect what was reported.

use std::cell::RefCell;

use log::Level;

/// Receives diagnostics produced by an operation.
pub trait Reporter {
    fn report(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.report(Level::Debug, message);
    }
}

/// Forwards every diagnostic to the [`log`] facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: Level, message: &str) {
        log::log!(level, "{message}");
    }
}

/// Keeps diagnostics in memory, in the order they were reported.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: RefCell<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    /// Messages reported at exactly `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod test {
    use super::{MemoryReporter, Reporter};
    use log::Level;

    #[test]
    fn memory_reporter_keeps_order_and_levels() {
        let reporter = MemoryReporter::new();
        reporter.info("first");
        reporter.error("second");
        reporter.debug("third");

        assert_eq!(
            reporter.entries(),
            vec![
                (Level::Info, "first".to_string()),
                (Level::Error, "second".to_string()),
                (Level::Debug, "third".to_string()),
            ]
        );
        assert_eq!(reporter.messages(Level::Error), vec!["second".to_string()]);
        assert!(reporter.contains(Level::Debug, "hir"));
        assert!(!reporter.contains(Level::Warn, "first"));
    }
}
