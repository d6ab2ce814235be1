//! Turns any [`Locator`] into a path on the local filesystem.
//!
//! Remote resources are downloaded into the caller's work directory. Archive
//! entries are handled by resolving the archive first into a hidden staging
//! directory, extracting it whole into the work directory, and then pointing
//! at the entry inside the extracted tree. Each nesting level is resolved
//! exactly once, and staged archives are removed once extracted.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;
use unjar_common::{LogObserver, Observer};

use crate::archive::{Archiver, ZipArchiver};
use crate::archive_entry::ArchiveEntry;
use crate::config::TransferConfig;
use crate::error::ResolveError;
use crate::locator::Locator;
use crate::transport::{Transport, Transports};

/// Prefix of the hidden directory an archive layer is staged in.
const STAGING_PREFIX: &str = ".unjar-";

/// Name for a staged archive layer whose source path has no file name.
const STAGED_ARCHIVE_NAME: &str = "archive.zip";

/// Resolves `locator` with the production transports, the zip archiver, and
/// `log`-backed progress reporting.
///
/// # Errors
///
/// Returns [`ResolveError`] when the transports cannot be built from
/// `config` or any resolution step fails.
pub fn resolve(
    locator: &Locator,
    work_dir: &Utf8Path,
    config: &TransferConfig,
) -> Result<Utf8PathBuf, ResolveError> {
    let transports = Transports::from_config(config).map_err(|source| ResolveError::Transport {
        locator: locator.to_string(),
        source,
    })?;
    Resolver::new(&transports, &ZipArchiver, &LogObserver).resolve(locator, work_dir)
}

/// Resolution with injected collaborators.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use unjar::archive::ZipArchiver;
/// use unjar::config::TransferConfig;
/// use unjar::transport::Transports;
/// use unjar::{Locator, Resolver};
/// use unjar_common::NullObserver;
///
/// let transports = Transports::from_config(&TransferConfig::default())?;
/// let resolver = Resolver::new(&transports, &ZipArchiver, &NullObserver);
/// let path = resolver.resolve(&Locator::local("/srv/data.csv"), Utf8Path::new("/tmp/work"))?;
/// assert_eq!(path, "/srv/data.csv");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    transport: &'a dyn Transport,
    archiver: &'a dyn Archiver,
    observer: &'a dyn Observer,
}

impl<'a> Resolver<'a> {
    /// Bundles the collaborators used for every resolution.
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

    /// Returns a local path holding the content `locator` denotes.
    ///
    /// Local paths are returned unchanged without touching the filesystem.
    /// Everything else is materialised under `work_dir`, which the caller
    /// owns exclusively for the duration of the call.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnsupportedScheme`] for schemes without a
    /// transport, and the matching [`ResolveError`] variant when a download,
    /// an extraction, or preparing `work_dir` fails.
    pub fn resolve(&self, locator: &Locator, work_dir: &Utf8Path) -> Result<Utf8PathBuf, ResolveError> {
        match locator {
            Locator::LocalFile { path } => {
                self.observer.debug(&format!("{path} is already local"));
                Ok(path.clone())
            }
            Locator::Http { .. } | Locator::Https { .. } | Locator::ObjectStore { .. } => {
                self.download(locator, work_dir)
            }
            Locator::ArchiveEntry(entry) => self.resolve_entry(entry, work_dir),
            Locator::Unsupported { scheme, .. } => Err(ResolveError::UnsupportedScheme {
                scheme: scheme.clone(),
            }),
        }
    }

    fn download(&self, locator: &Locator, work_dir: &Utf8Path) -> Result<Utf8PathBuf, ResolveError> {
        let file_name = download_name(locator)?;
        prepare_work_dir(work_dir)?;
        let dest = work_dir.join(file_name);
        self.fetch(locator, &dest)?;
        Ok(dest)
    }

    fn fetch(&self, locator: &Locator, dest: &Utf8Path) -> Result<(), ResolveError> {
        self.observer.info(&format!("downloading {locator} to {dest}"));
        self.transport
            .fetch(locator, dest)
            .map_err(|source| ResolveError::Transport {
                locator: locator.to_string(),
                source,
            })
    }

    fn resolve_entry(&self, entry: &ArchiveEntry, work_dir: &Utf8Path) -> Result<Utf8PathBuf, ResolveError> {
        let relative = entry
            .relative_path()
            .ok_or_else(|| ResolveError::EntryEscapesWorkDir {
                entry: entry.entry_path().to_owned(),
            })?;

        match entry.inner() {
            Locator::LocalFile { path } => {
                prepare_work_dir(work_dir)?;
                self.extract(path, work_dir)?;
            }
            Locator::Unsupported { scheme, .. } => {
                return Err(ResolveError::UnsupportedScheme {
                    scheme: scheme.clone(),
                });
            }
            inner => {
                let staged = self.stage_archive(inner, work_dir)?;
                self.extract(staged.archive(), work_dir)?;
            }
        }

        if relative.as_str().is_empty() {
            Ok(work_dir.to_owned())
        } else {
            Ok(work_dir.join(relative))
        }
    }

    /// Materialises a non-local archive layer in a hidden directory under
    /// `work_dir`, so extracting it cannot overwrite the archive itself.
    fn stage_archive(&self, inner: &Locator, work_dir: &Utf8Path) -> Result<StagedArchive<'a>, ResolveError> {
        if let Locator::ArchiveEntry(_) = inner {
            let extracted = self.resolve(inner, work_dir)?;
            let name = extracted.file_name().unwrap_or(STAGED_ARCHIVE_NAME);
            let staged = StagedArchive::create(work_dir, name, self.observer)?;
            fs::rename(&extracted, staged.archive()).map_err(|source| ResolveError::Staging {
                path: extracted.clone(),
                source,
            })?;
            return Ok(staged);
        }

        let name = download_name(inner)?;
        let staged = StagedArchive::create(work_dir, name, self.observer)?;
        self.fetch(inner, staged.archive())?;
        Ok(staged)
    }

    fn extract(&self, archive: &Utf8Path, work_dir: &Utf8Path) -> Result<(), ResolveError> {
        self.observer.info(&format!("extracting {archive} into {work_dir}"));
        let extracted = self
            .archiver
            .extract(archive, work_dir)
            .map_err(|source| ResolveError::Extraction {
                archive: archive.to_owned(),
                source,
            })?;
        self.observer
            .debug(&format!("extracted {} entries from {archive}", extracted.len()));
        Ok(())
    }
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

fn prepare_work_dir(work_dir: &Utf8Path) -> Result<(), ResolveError> {
    fs::create_dir_all(work_dir).map_err(|source| ResolveError::WorkDir {
        path: work_dir.to_owned(),
        source,
    })
}

/// Names the local copy of a remote resource after its final path segment.
fn download_name(locator: &Locator) -> Result<&str, ResolveError> {
    locator
        .file_name()
        .filter(|name| !matches!(*name, "." | ".."))
        .ok_or_else(|| ResolveError::MissingFileName {
            locator: locator.to_string(),
        })
}

/// An archive this resolution materialised, held in a hidden directory
/// under the work directory until it has been extracted.
///
/// Dropping it removes the directory. Removal failures are reported through
/// the observer and never surfaced.
struct StagedArchive<'o> {
    dir: Option<TempDir>,
    archive: Utf8PathBuf,
    observer: &'o dyn Observer,
}

impl<'o> StagedArchive<'o> {
    fn create(work_dir: &Utf8Path, file_name: &str, observer: &'o dyn Observer) -> Result<Self, ResolveError> {
        prepare_work_dir(work_dir)?;
        let staging_error = |source| ResolveError::Staging {
            path: work_dir.to_owned(),
            source,
        };
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(work_dir)
            .map_err(staging_error)?;
        let archive = Utf8Path::from_path(dir.path())
            .ok_or_else(|| {
                staging_error(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "staging path is not valid UTF-8",
                ))
            })?
            .join(file_name);
        Ok(Self {
            dir: Some(dir),
            archive,
            observer,
        })
    }

    fn archive(&self) -> &Utf8Path {
        &self.archive
    }
}

impl Drop for StagedArchive<'_> {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        match dir.close() {
            Ok(()) => self.observer.debug(&format!("removed {}", self.archive)),
            Err(err) => self
                .observer
                .error(&format!("failed to remove {}: {err}", self.archive)),
        }
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
