//! [`Archiver`] backed by the `zip` crate.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::tree;
use super::{ArchiveError, Archiver, validate_entry_path};
use crate::archive_entry::entry_segments;

/// Default archiver reading and writing deflate-compressed zip files.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use unjar::archive::{Archiver, ZipArchiver};
///
/// let written = ZipArchiver.pack(
///     Utf8Path::new("/tmp/site.zip"),
///     Utf8Path::new("/tmp/site"),
///     "",
/// )?;
/// println!("packed {written} files");
/// # Ok::<(), unjar::archive::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn extract(&self, archive: &Utf8Path, dest_dir: &Utf8Path) -> Result<Vec<String>, ArchiveError> {
        let mut zip = ZipArchive::new(fs::File::open(archive)?)?;
        let mut extracted = Vec::new();

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            let name = entry.name().to_owned();

            validate_entry_path(&name)?;
            if entry.is_dir() {
                continue;
            }

            let dest_path = dest_dir.join(&name);
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut output = fs::File::create(&dest_path)?;
            io::copy(&mut entry, &mut output)?;

            extracted.push(name);
        }

        Ok(extracted)
    }

    fn pack(
        &self,
        archive: &Utf8Path,
        source: &Utf8Path,
        entry_root: &str,
    ) -> Result<usize, ArchiveError> {
        let root = entry_segments(entry_root)
            .ok_or_else(|| ArchiveError::PathTraversal {
                path: entry_root.to_owned(),
            })?
            .join("/");

        let entries = if fs::metadata(source)?.is_dir() {
            tree::walk(source)?
                .into_iter()
                .filter(|file| file.path.as_path() != archive)
                .map(|file| (file.path, join_entry(&root, &file.name)))
                .collect()
        } else {
            vec![(source.to_owned(), single_file_name(source, entry_root, root)?)]
        };

        if let Some(parent) = archive.parent().filter(|parent| !parent.as_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let written = write_archive(archive, &entries);
        if written.is_err() && fs::remove_file(archive).is_err() {
            // The write error is the one worth reporting.
        }
        written
    }
}

/// Names the sole entry of an archive built from one file.
fn single_file_name(
    source: &Utf8Path,
    entry_root: &str,
    root: String,
) -> Result<String, ArchiveError> {
    if !root.is_empty() && !entry_root.ends_with('/') {
        return Ok(root);
    }
    let file_name = source.file_name().ok_or_else(|| {
        ArchiveError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{source} has no file name"),
        ))
    })?;
    Ok(join_entry(&root, file_name))
}

fn join_entry(root: &str, name: &str) -> String {
    if root.is_empty() {
        name.to_owned()
    } else {
        format!("{root}/{name}")
    }
}

/// Write `(source_path, entry_name)` pairs to a new zip file at `archive`.
fn write_archive(archive: &Utf8Path, entries: &[(Utf8PathBuf, String)]) -> Result<usize, ArchiveError> {
    let mut writer = ZipWriter::new(fs::File::create(archive)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (source_path, entry_name) in entries {
        writer.start_file(entry_name.as_str(), options)?;
        let mut input = fs::File::open(source_path)?;
        io::copy(&mut input, &mut writer)?;
    }

    writer.finish()?;
    Ok(entries.len())
}
