//! The `jar:<inner-locator>!/<entry-path>` codec.
//!
//! An archive entry pairs the locator of a zip archive with a path inside
//! it. The split happens at the first `!/` after the `jar:` prefix; the
//! entry path is kept verbatim and only normalised when the resolver or
//! publisher maps it onto a directory.

use std::fmt;

use camino::Utf8PathBuf;

use crate::error::{ParseError, ParseResult};
use crate::locator::Locator;

/// Literal prefix of archive-entry locators.
pub const ARCHIVE_PREFIX: &str = "jar:";

/// Separator between the inner locator and the entry path.
pub const ENTRY_SEPARATOR: &str = "!/";

const MIN_LEN: usize = ARCHIVE_PREFIX.len() + ENTRY_SEPARATOR.len();

/// A path inside a zip archive that is itself located by `inner`.
///
/// # Examples
///
/// ```
/// use unjar::{ArchiveEntry, Locator};
///
/// let entry = ArchiveEntry::parse("jar:https://example.test/a.zip!/docs/guide.txt")?;
/// assert_eq!(entry.entry_path(), "docs/guide.txt");
/// assert_eq!(entry.inner().scheme(), "https");
/// assert_eq!(
///     entry.to_string(),
///     "jar:https://example.test/a.zip!/docs/guide.txt"
/// );
/// # Ok::<(), unjar::ParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    inner: Box<Locator>,
    entry_path: String,
}

impl ArchiveEntry {
    /// Pairs an archive locator with an entry path.
    ///
    /// Nesting is expressed by passing another [`Locator::ArchiveEntry`] as
    /// `inner`.
    #[must_use]
    pub fn new(inner: Locator, entry_path: impl Into<String>) -> Self {
        Self {
            inner: Box::new(inner),
            entry_path: entry_path.into(),
        }
    }

    /// Parses `jar:<inner-locator>!/<entry-path>`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooShort`], [`ParseError::MissingPrefix`], or
    /// [`ParseError::MissingSeparator`] for malformed text, and
    /// [`ParseError::InvalidInner`] when the inner locator does not parse.
    pub fn parse(input: &str) -> ParseResult<Self> {
        if input.len() < MIN_LEN {
            return Err(ParseError::TooShort {
                input: input.to_owned(),
            });
        }
        let rest = input
            .strip_prefix(ARCHIVE_PREFIX)
            .ok_or_else(|| ParseError::MissingPrefix {
                input: input.to_owned(),
            })?;
        let (inner_text, entry_path) =
            rest.split_once(ENTRY_SEPARATOR)
                .ok_or_else(|| ParseError::MissingSeparator {
                    input: input.to_owned(),
                })?;
        let inner = Locator::parse(inner_text).map_err(|source| ParseError::InvalidInner {
            input: input.to_owned(),
            source: Box::new(source),
        })?;
        Ok(Self::new(inner, entry_path))
    }

    /// Returns the locator of the archive itself.
    #[must_use]
    pub fn inner(&self) -> &Locator {
        &self.inner
    }

    /// Returns the entry path exactly as written.
    #[must_use]
    pub fn entry_path(&self) -> &str {
        &self.entry_path
    }

    /// Returns `true` when the entry denotes the whole archive.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.entry_path.is_empty()
    }

    /// Returns the entry path as a normalised relative path.
    ///
    /// Empty and `.` segments are dropped and `..` removes the preceding
    /// segment. Returns `None` when `..` would climb above the archive root.
    ///
    /// # Examples
    ///
    /// ```
    /// use unjar::{ArchiveEntry, Locator};
    ///
    /// let entry = ArchiveEntry::new(Locator::local("a.zip"), "/docs/./old/../guide.txt");
    /// assert_eq!(entry.relative_path(), Some("docs/guide.txt".into()));
    ///
    /// let escaping = ArchiveEntry::new(Locator::local("a.zip"), "../etc/passwd");
    /// assert_eq!(escaping.relative_path(), None);
    /// ```
    #[must_use]
    pub fn relative_path(&self) -> Option<Utf8PathBuf> {
        normalise_entry_path(&self.entry_path)
    }
}

impl fmt::Display for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ARCHIVE_PREFIX}{}{ENTRY_SEPARATOR}{}",
            self.inner, self.entry_path
        )
    }
}

/// Lexically normalises a `/`-separated entry path.
pub(crate) fn normalise_entry_path(entry: &str) -> Option<Utf8PathBuf> {
    entry_segments(entry).map(|segments| segments.into_iter().collect())
}

/// Splits an entry path into its normalised segments.
///
/// Returns `None` when `..` climbs above the root.
pub(crate) fn entry_segments(entry: &str) -> Option<Vec<&str>> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in entry.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments)
}
