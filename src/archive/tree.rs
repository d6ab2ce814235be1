//! Directory walking for archive packing.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};

/// A regular file found under a walked root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TreeFile {
    /// Location on disk.
    pub(crate) path: Utf8PathBuf,
    /// Path relative to the root, `/`-separated.
    pub(crate) name: String,
}

/// Lists every regular file under `root`, sorted by relative name.
///
/// Symbolic links and other special files are skipped.
pub(crate) fn walk(root: &Utf8Path) -> io::Result<Vec<TreeFile>> {
    let mut files = Vec::new();
    walk_into(root, "", &mut files)?;
    files.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(files)
}

fn walk_into(dir: &Utf8Path, prefix: &str, files: &mut Vec<TreeFile>) -> io::Result<()> {
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = if prefix.is_empty() {
            entry.file_name().to_owned()
        } else {
            format!("{prefix}/{}", entry.file_name())
        };
        if file_type.is_dir() {
            walk_into(entry.path(), &name, files)?;
        } else if file_type.is_file() {
            files.push(TreeFile {
                path: entry.path().to_owned(),
                name,
            });
        }
    }
    Ok(())
}
