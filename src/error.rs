//! Error types for locator parsing, resolution, and publication.
//!
//! Every variant names the locator or path involved and carries the
//! lower-layer error as its source, so the outermost caller can report the
//! deepest failure without losing context.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::transport::TransportError;

/// Errors arising from malformed locator text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The locator text is empty.
    #[error("locator is empty")]
    Empty,

    /// An archive-entry locator is shorter than `jar:!/`.
    #[error("failed to parse {input}: too short for an archive entry")]
    TooShort {
        /// The rejected input.
        input: String,
    },

    /// An archive-entry locator does not start with `jar:`.
    #[error("failed to parse {input}: expected a jar: prefix")]
    MissingPrefix {
        /// The rejected input.
        input: String,
    },

    /// An archive-entry locator has no `!/` separator.
    #[error("failed to parse {input}: missing !/ entry separator")]
    MissingSeparator {
        /// The rejected input.
        input: String,
    },

    /// The locator wrapped by an archive entry is itself invalid.
    #[error("failed to parse {input}: {source}")]
    InvalidInner {
        /// The archive-entry text being parsed.
        input: String,
        /// Why the inner locator was rejected.
        #[source]
        source: Box<ParseError>,
    },

    /// An HTTP(S) locator is not a valid URL.
    #[error("invalid URL {input}: {source}")]
    InvalidUrl {
        /// The rejected input.
        input: String,
        /// The URL parser's diagnosis.
        #[source]
        source: url::ParseError,
    },

    /// An object-store locator does not name a bucket.
    #[error("object store locator {input} has no bucket")]
    MissingBucket {
        /// The rejected input.
        input: String,
    },

    /// An object-store locator does not name a key.
    #[error("object store locator {input} has no key")]
    MissingKey {
        /// The rejected input.
        input: String,
    },

    /// A `file:` locator does not denote a usable UTF-8 local path.
    #[error("file locator {input} does not denote a local path")]
    InvalidFilePath {
        /// The rejected input.
        input: String,
    },
}

/// Errors arising while turning a locator into a local path.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The locator's scheme has no transport.
    #[error("unsupported scheme {scheme}")]
    UnsupportedScheme {
        /// The scheme that was requested.
        scheme: String,
    },

    /// Fetching a remote resource failed.
    #[error("failed to fetch {locator}: {source}")]
    Transport {
        /// The locator being fetched.
        locator: String,
        /// The transport failure.
        #[source]
        source: TransportError,
    },

    /// Extracting a materialised archive failed.
    #[error("failed to extract {archive}: {source}")]
    Extraction {
        /// The local archive being extracted.
        archive: Utf8PathBuf,
        /// The archive adapter failure.
        #[source]
        source: ArchiveError,
    },

    /// A remote locator has no final path segment to name the download.
    #[error("cannot derive a file name from {locator}")]
    MissingFileName {
        /// The locator without a usable name.
        locator: String,
    },

    /// An archive entry path climbs above the work directory.
    #[error("archive entry {entry} escapes the work directory")]
    EntryEscapesWorkDir {
        /// The offending entry path.
        entry: String,
    },

    /// The work directory could not be created.
    #[error("cannot prepare work directory {path}: {source}")]
    WorkDir {
        /// The work directory.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An archive layer could not be moved into its staging directory.
    #[error("cannot stage archive {path}: {source}")]
    Staging {
        /// The work directory or the archive being staged.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors arising while delivering local data to a destination locator.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The destination scheme has no transport.
    #[error("unsupported scheme {scheme}")]
    UnsupportedScheme {
        /// The scheme that was requested.
        scheme: String,
    },

    /// Uploading to a remote destination failed.
    #[error("failed to upload to {locator}: {source}")]
    Transport {
        /// The destination locator.
        locator: String,
        /// The transport failure.
        #[source]
        source: TransportError,
    },

    /// Packing local data into an archive failed.
    #[error("failed to pack {archive}: {source}")]
    Packing {
        /// The archive being written.
        archive: Utf8PathBuf,
        /// The archive adapter failure.
        #[source]
        source: ArchiveError,
    },

    /// Directories can only be published into archive entries.
    #[error("cannot upload directory {path} to {locator}; wrap the destination in jar:…!/")]
    DirectoryUpload {
        /// The local directory.
        path: Utf8PathBuf,
        /// The remote destination.
        locator: String,
    },

    /// An archive entry path climbs above the archive root.
    #[error("archive entry {entry} escapes the archive root")]
    EntryEscapesArchive {
        /// The offending entry path.
        entry: String,
    },

    /// The temporary staging area for a packed archive could not be created.
    #[error("cannot stage temporary archive: {source}")]
    Staging {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A temporary path is not valid UTF-8.
    #[error("temporary path {} is not valid UTF-8", path.display())]
    NonUtf8Path {
        /// The offending path.
        path: std::path::PathBuf,
    },
}

/// Result alias for locator parsing.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
