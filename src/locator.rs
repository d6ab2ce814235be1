//! Typed resource locators.
//!
//! A [`Locator`] is parsed once from text such as `https://host/a.zip`,
//! `s3://bucket/key`, `file:///tmp/a.zip`, or
//! `jar:https://host/a.zip!/docs/readme.txt`, then handed to the resolver or
//! publisher. Text without a recognisable scheme is a local path.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use url::Url;

use crate::archive_entry::{ARCHIVE_PREFIX, ArchiveEntry};
use crate::error::{ParseError, ParseResult};

/// Where a resource lives.
///
/// # Examples
///
/// ```
/// use unjar::Locator;
///
/// let locator: Locator = "s3://releases/app/bundle.zip".parse()?;
/// assert_eq!(locator.scheme(), "s3");
/// assert_eq!(locator.file_name(), Some("bundle.zip"));
/// assert_eq!(locator.to_string(), "s3://releases/app/bundle.zip");
/// # Ok::<(), unjar::ParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A plain HTTP endpoint.
    Http {
        /// The endpoint URL.
        url: Url,
    },
    /// A TLS HTTP endpoint.
    Https {
        /// The endpoint URL.
        url: Url,
    },
    /// An object in an S3-compatible bucket (`s3://bucket/key`).
    ObjectStore {
        /// The bucket name.
        bucket: String,
        /// The object key, without a leading slash.
        key: String,
    },
    /// A path already on the local filesystem.
    LocalFile {
        /// The local path.
        path: Utf8PathBuf,
    },
    /// A path inside a zip archive located elsewhere.
    ArchiveEntry(ArchiveEntry),
    /// A well-formed locator whose scheme has no adapter.
    Unsupported {
        /// The scheme as written.
        scheme: String,
        /// Everything after the scheme's colon.
        specific: String,
    },
}

impl Locator {
    /// Parses locator text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the text is empty or a recognised scheme's
    /// specific part is malformed.
    pub fn parse(input: &str) -> ParseResult<Self> {
        if input.is_empty() {
            return Err(ParseError::Empty);
        }
        let Some((scheme, specific)) = split_scheme(input) else {
            return Ok(Self::LocalFile {
                path: Utf8PathBuf::from(input),
            });
        };

        // The archive prefix is literal; any other spelling of it is an
        // unknown scheme.
        if input.starts_with(ARCHIVE_PREFIX) {
            return ArchiveEntry::parse(input).map(Self::ArchiveEntry);
        }
        match scheme.to_ascii_lowercase().as_str() {
            "http" => parse_url(input).map(|url| Self::Http { url }),
            "https" => parse_url(input).map(|url| Self::Https { url }),
            "s3" => parse_object_store(input, specific),
            "file" => parse_file(input, specific),
            _ => Ok(Self::Unsupported {
                scheme: scheme.to_owned(),
                specific: specific.to_owned(),
            }),
        }
    }

    /// Builds a local-file locator.
    #[must_use]
    pub fn local(path: impl Into<Utf8PathBuf>) -> Self {
        Self::LocalFile { path: path.into() }
    }

    /// Returns the scheme name this locator is written with.
    #[must_use]
    pub fn scheme(&self) -> &str {
        match self {
            Self::Http { .. } => "http",
            Self::Https { .. } => "https",
            Self::ObjectStore { .. } => "s3",
            Self::LocalFile { .. } => "file",
            Self::ArchiveEntry(_) => "jar",
            Self::Unsupported { scheme, .. } => scheme,
        }
    }

    /// Returns `true` for locators served by a transport adapter.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Https { .. } | Self::ObjectStore { .. }
        )
    }

    /// Returns the final non-empty path segment, used to name downloads.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Http { url } | Self::Https { url } => url
                .path_segments()
                .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last()),
            Self::ObjectStore { key, .. } => last_segment(key),
            Self::LocalFile { path } => path.file_name(),
            Self::ArchiveEntry(entry) => last_segment(entry.entry_path()),
            Self::Unsupported { .. } => None,
        }
    }
}

impl FromStr for Locator {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl From<ArchiveEntry> for Locator {
    fn from(entry: ArchiveEntry) -> Self {
        Self::ArchiveEntry(entry)
    }
}

impl From<&Utf8Path> for Locator {
    fn from(path: &Utf8Path) -> Self {
        Self::local(path)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { url } | Self::Https { url } => f.write_str(url.as_str()),
            Self::ObjectStore { bucket, key } => write!(f, "s3://{bucket}/{key}"),
            Self::LocalFile { path } => match Url::from_file_path(path) {
                Ok(url) => f.write_str(url.as_str()),
                Err(()) => write!(f, "file:{path}"),
            },
            Self::ArchiveEntry(entry) => entry.fmt(f),
            Self::Unsupported { scheme, specific } => write!(f, "{scheme}:{specific}"),
        }
    }
}

/// Splits `scheme:rest` when the prefix is a valid URI scheme.
///
/// Single letters are left alone so `C:\data\a.zip` stays a local path.
fn split_scheme(input: &str) -> Option<(&str, &str)> {
    let (scheme, specific) = input.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = scheme.len() > 1
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some((scheme, specific))
}

fn parse_url(input: &str) -> ParseResult<Url> {
    Url::parse(input).map_err(|source| ParseError::InvalidUrl {
        input: input.to_owned(),
        source,
    })
}

fn parse_object_store(input: &str, specific: &str) -> ParseResult<Locator> {
    let address = specific
        .strip_prefix("//")
        .ok_or_else(|| ParseError::MissingBucket {
            input: input.to_owned(),
        })?;
    let (bucket, key) = address.split_once('/').unwrap_or((address, ""));
    if bucket.is_empty() {
        return Err(ParseError::MissingBucket {
            input: input.to_owned(),
        });
    }
    let trimmed_key = key.trim_start_matches('/');
    if trimmed_key.is_empty() {
        return Err(ParseError::MissingKey {
            input: input.to_owned(),
        });
    }
    Ok(Locator::ObjectStore {
        bucket: bucket.to_owned(),
        key: trimmed_key.to_owned(),
    })
}

fn parse_file(input: &str, specific: &str) -> ParseResult<Locator> {
    let invalid = || ParseError::InvalidFilePath {
        input: input.to_owned(),
    };
    if !specific.starts_with("//") {
        if specific.is_empty() {
            return Err(invalid());
        }
        return Ok(Locator::local(specific));
    }

    let url = Url::parse(input).map_err(|_| invalid())?;
    let path = url.to_file_path().map_err(|()| invalid())?;
    let utf8 = Utf8PathBuf::from_path_buf(path).map_err(|_| invalid())?;
    Ok(Locator::LocalFile { path: utf8 })
}

fn last_segment(path: &str) -> Option<&str> {
    path.rsplit('/').find(|segment| !segment.is_empty())
}
