//! Shared infrastructure for unjar crates: the observability collaborator
//! injected into the resolver and publisher.

pub mod observe;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use observe::{LOG_TARGET, LogObserver, NullObserver, Observer};
