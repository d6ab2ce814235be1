//! Zip archive extraction and packing.
//!
//! [`Archiver`] is the seam the resolver and publisher depend on;
//! [`ZipArchiver`] is the production implementation. Both directions refuse
//! entry names that would land outside the directory or archive root.

mod tree;
mod zip_codec;

use camino::{Utf8Component, Utf8Path};

pub use zip_codec::ZipArchiver;

/// Extracts and packs zip archives, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait Archiver {
    /// Extracts every file entry of `archive` into `dest_dir`.
    ///
    /// Subdirectories are recreated and directory-only entries skipped.
    /// Returns the names of the entries written.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::PathTraversal`] if an entry would escape
    /// `dest_dir`, [`ArchiveError::Zip`] for a malformed archive, and
    /// [`ArchiveError::Io`] on I/O failures.
    fn extract(&self, archive: &Utf8Path, dest_dir: &Utf8Path) -> Result<Vec<String>, ArchiveError>;

    /// Writes a new archive at `archive` holding the file or directory tree
    /// at `source`.
    ///
    /// Entries are placed under `entry_root`. A single file is named by
    /// `entry_root` itself unless it is empty or ends with `/`, in which case
    /// the file name is appended. Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::PathTraversal`] if `entry_root` climbs above
    /// the archive root, and [`ArchiveError::Io`] or [`ArchiveError::Zip`]
    /// when reading the source or writing the archive fails.
    fn pack(&self, archive: &Utf8Path, source: &Utf8Path, entry_root: &str)
    -> Result<usize, ArchiveError>;
}

/// Errors arising from archive extraction and packing.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O error while reading or writing files.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The zip container is malformed or could not be written.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry name escapes the destination directory or archive root.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },
}

/// Validate that an entry name does not escape its root via `..`
/// components or absolute paths.
fn validate_entry_path(name: &str) -> Result<(), ArchiveError> {
    let path = Utf8Path::new(name);
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ArchiveError::PathTraversal {
            path: name.to_owned(),
        });
    }
    Ok(())
}
