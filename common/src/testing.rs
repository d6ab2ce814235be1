//! Test doubles for the [`Observer`](crate::Observer) seam.

use std::cell::RefCell;

use log::Level;

use crate::Observer;

/// Observer that records every message with its level.
///
/// # Examples
///
/// ```
/// use log::Level;
/// use unjar_common::Observer;
/// use unjar_common::testing::RecordingObserver;
///
/// let observer = RecordingObserver::default();
/// observer.error("cleanup failed");
/// assert!(observer.contains(Level::Error, "cleanup"));
/// ```
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<(Level, String)>>,
}

impl RecordingObserver {
    /// Returns a snapshot of the recorded `(level, message)` pairs.
    #[must_use]
    pub fn events(&self) -> Vec<(Level, String)> {
        self.events.borrow().clone()
    }

    /// Returns the messages recorded at `level`, in emission order.
    #[must_use]
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(recorded, _)| *recorded == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Returns `true` when a message at `level` contains `needle`.
    #[must_use]
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages_at(level)
            .iter()
            .any(|message| message.contains(needle))
    }

    fn record(&self, level: Level, message: &str) {
        self.events.borrow_mut().push((level, message.to_owned()));
    }
}

impl Observer for RecordingObserver {
    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }
}
