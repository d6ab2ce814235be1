//! Transport adapters that move bytes between remote locators and local
//! files.
//!
//! [`Transport`] is the seam the resolver and publisher depend on. The
//! production implementations use a shared blocking `ureq` agent:
//! [`HttpTransport`] for `http`/`https` locators and [`ObjectStoreTransport`]
//! for `s3` locators. [`Transports`] routes a locator to the matching one.

mod http;
mod object_store;

use std::fs;
use std::io;
use std::time::Duration;

use camino::Utf8Path;
use rusty_s3::Credentials;
use unjar_common::LOG_TARGET;

use crate::config::{ConfigError, TransferConfig};
use crate::locator::Locator;

pub use http::HttpTransport;
pub use object_store::ObjectStoreTransport;

/// Moves a single file to or from a remote locator.
///
/// Only remote locators (`http`, `https`, `s3`) are accepted; local paths and
/// archive entries are handled by the orchestrators before a transport is
/// reached.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Downloads the resource at `source` into the file `dest`.
    ///
    /// Implementations remove a partially written `dest` before returning an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the request or the file write fails.
    fn fetch(&self, source: &Locator, dest: &Utf8Path) -> Result<(), TransportError>;

    /// Uploads the file at `source` to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the file cannot be read or the request
    /// fails.
    fn push(&self, source: &Utf8Path, dest: &Locator) -> Result<(), TransportError>;
}

/// Errors arising from transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request failed or returned an error status.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The requested URL.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The remote resource does not exist (HTTP 404).
    #[error("resource not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The locator is not served by this transport.
    #[error("{locator} is not served by the {transport} transport")]
    UnsupportedLocator {
        /// The rejected locator.
        locator: String,
        /// The transport that rejected it.
        transport: &'static str,
    },

    /// An object-store request URL could not be built.
    #[error("invalid object store endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// The configured endpoint.
        endpoint: String,
        /// Why the URL could not be built.
        reason: String,
    },

    /// The transfer configuration failed validation.
    #[error("invalid transfer configuration: {0}")]
    Config(#[source] Box<ConfigError>),

    /// Reading or writing the local file failed.
    #[error("I/O error during transfer: {0}")]
    Io(#[from] io::Error),
}

/// Routes each remote locator to its transport.
///
/// # Examples
///
/// ```
/// use unjar::config::TransferConfig;
/// use unjar::transport::Transports;
///
/// let transports = Transports::from_config(&TransferConfig::default())?;
/// # let _ = transports;
/// # Ok::<(), unjar::transport::TransportError>(())
/// ```
#[derive(Clone)]
pub struct Transports {
    http: HttpTransport,
    object_store: ObjectStoreTransport,
}

impl Transports {
    /// Builds the HTTP and object-store transports from configuration.
    ///
    /// Both share one `ureq` agent. Object-store requests are signed when
    /// `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY` (and optionally
    /// `AWS_SESSION_TOKEN`) are set.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Config`] when `config` fails validation and
    /// [`TransportError::InvalidEndpoint`] when the object-store endpoint is
    /// not a usable base URL.
    pub fn from_config(config: &TransferConfig) -> Result<Self, TransportError> {
        Self::with_credentials(config, Credentials::from_env())
    }

    /// Builds the transports with explicit object-store credentials, or
    /// unsigned object-store requests when `credentials` is `None`.
    ///
    /// # Errors
    ///
    /// As for [`Transports::from_config`].
    pub fn with_credentials(
        config: &TransferConfig,
        credentials: Option<Credentials>,
    ) -> Result<Self, TransportError> {
        config
            .validate()
            .map_err(|err| TransportError::Config(Box::new(err)))?;
        let agent = http_agent(config.http.timeout());
        let user_agent = config.http.user_agent.clone();
        let mut object_store =
            ObjectStoreTransport::new(agent.clone(), user_agent.clone(), &config.object_store.endpoint)?;
        if let Some(credentials) = credentials {
            let region = &config.object_store.region;
            log::debug!(target: LOG_TARGET, "signing object store requests for {region}");
            object_store = object_store.with_credentials(credentials, region.as_str());
        }
        Ok(Self {
            http: HttpTransport::new(agent, user_agent),
            object_store,
        })
    }

    fn route(&self, locator: &Locator) -> Result<&dyn Transport, TransportError> {
        match locator {
            Locator::Http { .. } | Locator::Https { .. } => Ok(&self.http),
            Locator::ObjectStore { .. } => Ok(&self.object_store),
            Locator::LocalFile { .. }
            | Locator::ArchiveEntry(_)
            | Locator::Unsupported { .. } => Err(unsupported(locator, "remote")),
        }
    }
}

impl std::fmt::Debug for Transports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transports")
            .field("http", &self.http)
            .field("object_store", &self.object_store)
            .finish()
    }
}

impl Transport for Transports {
    fn fetch(&self, source: &Locator, dest: &Utf8Path) -> Result<(), TransportError> {
        self.route(source)?.fetch(source, dest)
    }

    fn push(&self, source: &Utf8Path, dest: &Locator) -> Result<(), TransportError> {
        self.route(dest)?.push(source, dest)
    }
}

/// Builds a `ureq` agent with a global request timeout.
fn http_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    ureq::Agent::new_with_config(config)
}

/// Map a ureq error to a [`TransportError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> TransportError {
    match err {
        ureq::Error::StatusCode(404) => TransportError::NotFound {
            url: url.to_owned(),
        },
        other => TransportError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

fn unsupported(locator: &Locator, transport: &'static str) -> TransportError {
    TransportError::UnsupportedLocator {
        locator: locator.to_string(),
        transport,
    }
}

/// Opens a file for upload together with its length.
fn open_upload(source: &Utf8Path) -> Result<(fs::File, u64), TransportError> {
    let file = fs::File::open(source)?;
    let len = file.metadata()?.len();
    Ok((file, len))
}

/// Stream a GET response body into `dest`, removing `dest` if the copy fails.
///
/// `label` names the request in logs and errors in place of `url`, which may
/// carry a signature.
fn download_to_file(
    agent: &ureq::Agent,
    user_agent: &str,
    url: &str,
    label: &str,
    dest: &Utf8Path,
) -> Result<(), TransportError> {
    log::trace!(target: LOG_TARGET, "GET {label}");
    let response = agent
        .get(url)
        .header("User-Agent", user_agent)
        .call()
        .map_err(|e| map_ureq_error(label, &e))?;
    let mut file = fs::File::create(dest)?;
    let copied = io::copy(&mut response.into_body().as_reader(), &mut file);
    if let Err(err) = copied {
        drop(file);
        if fs::remove_file(dest).is_err() {
            // The copy error is the one worth reporting.
        }
        return Err(TransportError::Io(err));
    }
    Ok(())
}
