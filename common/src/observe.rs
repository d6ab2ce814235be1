//! Observability seam for resolution and publication.
//!
//! Orchestrators never call the `log` macros directly. They receive an
//! [`Observer`] so callers decide where progress and cleanup failures go:
//! the CLI forwards them to `log`, tests record or discard them.

/// Log target used by [`LogObserver`].
pub const LOG_TARGET: &str = "unjar";

/// Receives progress and diagnostic messages from the orchestrators.
///
/// # Examples
///
/// ```
/// use unjar_common::{NullObserver, Observer};
///
/// let observer = NullObserver;
/// observer.info("download started");
/// ```
pub trait Observer {
    /// A user-facing progress message.
    fn info(&self, message: &str);

    /// Detail useful when diagnosing a resolution.
    fn debug(&self, message: &str);

    /// A failure that was handled without aborting the operation.
    fn error(&self, message: &str);
}

/// Forwards messages to the `log` facade under [`LOG_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn info(&self, message: &str) {
        log::info!(target: LOG_TARGET, "{message}");
    }

    fn debug(&self, message: &str) {
        log::debug!(target: LOG_TARGET, "{message}");
    }

    fn error(&self, message: &str) {
        log::error!(target: LOG_TARGET, "{message}");
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn info(&self, _message: &str) {}

    fn debug(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}
