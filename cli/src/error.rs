//! Error types for the `unjar` binary.

use camino::Utf8PathBuf;
use thiserror::Error;
use unjar::config::ConfigError;
use unjar::{ParseError, PublishError, ResolveError};

/// Errors that end a CLI run with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A locator argument is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Publication failed.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The work directory could not be made absolute.
    #[error("cannot use work directory {path}: {reason}")]
    WorkDir {
        /// The work directory as given.
        path: Utf8PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// Writing the result to stdout failed.
    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
