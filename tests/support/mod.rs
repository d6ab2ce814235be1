//! Shared fixtures for the integration suites.
//!
//! [`DirectoryTransport`] stands in for a remote server: objects are stored
//! in a local directory under their final path segment, so a scenario can
//! publish to `s3://bucket/site.zip` and later fetch
//! `https://mirror.example.test/site.zip` from the same store.

use std::cell::Cell;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use unjar::Locator;
use unjar::transport::{Transport, TransportError};

/// Host used by scenarios for HTTPS locators served from the fake store.
pub const MIRROR: &str = "https://mirror.example.test";

/// A scratch directory with a UTF-8 path.
pub struct Scratch {
    _dir: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Scratch {
    /// Creates an empty scratch directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        Self { _dir: dir, root }
    }

    /// Returns the scratch root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Writes `foo.txt` and `bar/baz.txt` under `dir`.
pub fn write_sample_tree(dir: &Utf8Path) {
    fs::create_dir_all(dir.join("bar")).expect("create sample tree");
    fs::write(dir.join("foo.txt"), "foo").expect("write foo.txt");
    fs::write(dir.join("bar/baz.txt"), "baz").expect("write bar/baz.txt");
}

/// Asserts that `dir` holds the files written by [`write_sample_tree`].
pub fn assert_sample_tree(dir: &Utf8Path) {
    assert_eq!(
        fs::read_to_string(dir.join("foo.txt")).expect("read foo.txt"),
        "foo"
    );
    assert_eq!(
        fs::read_to_string(dir.join("bar/baz.txt")).expect("read bar/baz.txt"),
        "baz"
    );
}

/// A transport backed by a local directory.
pub struct DirectoryTransport {
    store: Utf8PathBuf,
    fetches: Cell<usize>,
    pushes: Cell<usize>,
}

impl DirectoryTransport {
    /// Serves and stores objects in `store`, creating it if needed.
    pub fn new(store: Utf8PathBuf) -> Self {
        fs::create_dir_all(&store).expect("create store");
        Self {
            store,
            fetches: Cell::new(0),
            pushes: Cell::new(0),
        }
    }

    /// Returns the on-disk location of the object named `name`.
    pub fn object(&self, name: &str) -> Utf8PathBuf {
        self.store.join(name)
    }

    /// Returns how many fetches were attempted.
    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }

    /// Returns how many pushes were attempted.
    pub fn pushes(&self) -> usize {
        self.pushes.get()
    }

    fn object_for(&self, locator: &Locator) -> Result<Utf8PathBuf, TransportError> {
        if !locator.is_remote() {
            return Err(TransportError::UnsupportedLocator {
                locator: locator.to_string(),
                transport: "directory",
            });
        }
        locator
            .file_name()
            .map(|name| self.object(name))
            .ok_or_else(|| TransportError::NotFound {
                url: locator.to_string(),
            })
    }
}

impl Transport for DirectoryTransport {
    fn fetch(&self, source: &Locator, dest: &Utf8Path) -> Result<(), TransportError> {
        self.fetches.set(self.fetches.get() + 1);
        let object = self.object_for(source)?;
        if !object.is_file() {
            return Err(TransportError::NotFound {
                url: source.to_string(),
            });
        }
        fs::copy(object, dest)?;
        Ok(())
    }

    fn push(&self, source: &Utf8Path, dest: &Locator) -> Result<(), TransportError> {
        self.pushes.set(self.pushes.get() + 1);
        let object = self.object_for(dest)?;
        fs::copy(source, object)?;
        Ok(())
    }
}
