//! Delivers a local file or directory to any [`Locator`].
//!
//! Remote destinations receive a single file through a [`Transport`].
//! Archive-entry destinations are packed first: straight into the archive
//! when it is a local path, otherwise into a temporary archive that is then
//! published to the inner locator.

use camino::Utf8Path;
use unjar_common::{LogObserver, Observer};

use crate::archive::{Archiver, ZipArchiver};
use crate::archive_entry::ArchiveEntry;
use crate::config::TransferConfig;
use crate::error::PublishError;
use crate::locator::Locator;
use crate::transport::{Transport, Transports};

const STAGED_ARCHIVE_NAME: &str = "archive.zip";

/// Publishes `local_path` with the production transports, the zip archiver,
/// and `log`-backed progress reporting.
///
/// # Errors
///
/// Returns [`PublishError`] when the transports cannot be built from
/// `config` or any publication step fails.
pub fn publish(
    local_path: &Utf8Path,
    destination: &Locator,
    config: &TransferConfig,
) -> Result<(), PublishError> {
    let transports = Transports::from_config(config).map_err(|source| PublishError::Transport {
        locator: destination.to_string(),
        source,
    })?;
    Publisher::new(&transports, &ZipArchiver, &LogObserver).publish(local_path, destination)
}

/// Publication with injected collaborators.
#[derive(Clone, Copy)]
pub struct Publisher<'a> {
    transport: &'a dyn Transport,
    archiver: &'a dyn Archiver,
    observer: &'a dyn Observer,
}

impl<'a> Publisher<'a> {
    /// Bundles the collaborators used for every publication.
    #[must_use]
    pub const fn new(
        transport: &'a dyn Transport,
        archiver: &'a dyn Archiver,
        observer: &'a dyn Observer,
    ) -> Self {
        Self {
            transport,
            archiver,
            observer,
        }
    }

    /// Makes the data at `local_path` available at `destination`.
    ///
    /// A local destination is a no-op: the data is already where a local
    /// locator would point.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::UnsupportedScheme`] for schemes without a
    /// transport, [`PublishError::DirectoryUpload`] when a directory is sent
    /// to a remote destination without an archive wrapper, and the matching
    /// [`PublishError`] variant when packing, staging, or uploading fails.
    pub fn publish(&self, local_path: &Utf8Path, destination: &Locator) -> Result<(), PublishError> {
        match destination {
            Locator::LocalFile { path } => {
                self.observer
                    .debug(&format!("{local_path} needs no publishing to local {path}"));
                Ok(())
            }
            Locator::Http { .. } | Locator::Https { .. } | Locator::ObjectStore { .. } => {
                self.upload(local_path, destination)
            }
            Locator::ArchiveEntry(entry) => self.publish_entry(local_path, entry),
            Locator::Unsupported { scheme, .. } => Err(PublishError::UnsupportedScheme {
                scheme: scheme.clone(),
            }),
        }
    }

    fn upload(&self, local_path: &Utf8Path, destination: &Locator) -> Result<(), PublishError> {
        if local_path.is_dir() {
            return Err(PublishError::DirectoryUpload {
                path: local_path.to_owned(),
                locator: destination.to_string(),
            });
        }
        self.observer
            .info(&format!("uploading {local_path} to {destination}"));
        self.transport
            .push(local_path, destination)
            .map_err(|source| PublishError::Transport {
                locator: destination.to_string(),
                source,
            })
    }

    fn publish_entry(&self, local_path: &Utf8Path, entry: &ArchiveEntry) -> Result<(), PublishError> {
        if entry.relative_path().is_none() {
            return Err(PublishError::EntryEscapesArchive {
                entry: entry.entry_path().to_owned(),
            });
        }

        let inner = entry.inner();
        if let Locator::LocalFile { path } = inner {
            return self.pack(local_path, path, entry.entry_path());
        }

        let staging = tempfile::Builder::new()
            .prefix("unjar-")
            .tempdir()
            .map_err(|source| PublishError::Staging { source })?;
        let staging_dir =
            Utf8Path::from_path(staging.path()).ok_or_else(|| PublishError::NonUtf8Path {
                path: staging.path().to_path_buf(),
            })?;
        let archive = staging_dir.join(staged_archive_name(inner));

        let published = self
            .pack(local_path, &archive, entry.entry_path())
            .and_then(|()| self.publish(&archive, inner));

        let staging_path = staging_dir.to_owned();
        if let Err(err) = staging.close() {
            self.observer
                .error(&format!("failed to remove staging directory {staging_path}: {err}"));
        }
        published
    }

    fn pack(&self, source: &Utf8Path, archive: &Utf8Path, entry_root: &str) -> Result<(), PublishError> {
        self.observer.info(&format!("packing {source} into {archive}"));
        let written = self
            .archiver
            .pack(archive, source, entry_root)
            .map_err(|err| PublishError::Packing {
                archive: archive.to_owned(),
                source: err,
            })?;
        self.observer
            .debug(&format!("packed {written} entries into {archive}"));
        Ok(())
    }
}

impl std::fmt::Debug for Publisher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher").finish_non_exhaustive()
    }
}

/// Names the staged archive after its destination where possible.
fn staged_archive_name(destination: &Locator) -> &str {
    destination
        .file_name()
        .filter(|name| !matches!(*name, "." | ".."))
        .unwrap_or(STAGED_ARCHIVE_NAME)
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;
