//! Transfer configuration loaded from TOML.
//!
//! Every key has a default, so an empty file (or no file) yields a working
//! configuration. Environment variables override file values so CI can
//! point at a local object-store gateway without writing a config file.
//! Object-store credentials are never read from the file; see
//! [`crate::transport::ObjectStoreTransport`].
//!
//! ```toml
//! [http]
//! timeout_secs = 30
//! user_agent = "unjar/0.1.0"
//!
//! [object_store]
//! endpoint = "https://s3.amazonaws.com"
//! region = "us-east-1"
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use thiserror::Error;
use unjar_common::LOG_TARGET;

/// Overrides [`ObjectStoreConfig::endpoint`].
pub const ENDPOINT_ENV: &str = "UNJAR_S3_ENDPOINT";

/// Overrides [`HttpConfig::timeout_secs`]; non-numeric values are ignored
/// with a warning.
pub const TIMEOUT_ENV: &str = "UNJAR_HTTP_TIMEOUT_SECS";

/// Overrides [`ObjectStoreConfig::region`].
pub const REGION_ENV: &str = "UNJAR_S3_REGION";

/// Standard AWS region variable, consulted when [`REGION_ENV`] is unset.
pub const AWS_REGION_ENV: &str = "AWS_REGION";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ENDPOINT: &str = "https://s3.amazonaws.com";
const DEFAULT_REGION: &str = "us-east-1";

/// Settings shared by every transport.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TransferConfig {
    /// HTTP agent settings, also used for object-store requests.
    pub http: HttpConfig,
    /// Object-store addressing.
    pub object_store: ObjectStoreConfig,
}

/// HTTP agent settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Global timeout for a single request, in seconds.
    pub timeout_secs: u64,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("unjar/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl HttpConfig {
    /// Returns the request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Object-store addressing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ObjectStoreConfig {
    /// Base URL; objects live at `<endpoint>/<bucket>/<key>`.
    pub endpoint: String,
    /// Signing region for authenticated requests.
    pub region: String,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            region: DEFAULT_REGION.to_owned(),
        }
    }
}

/// Errors arising while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read configuration {path}: {source}")]
    Read {
        /// The configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for [`TransferConfig`].
    #[error("invalid configuration {origin}: {source}")]
    Parse {
        /// The file path, or `<inline>` for string input.
        origin: String,
        /// The TOML diagnosis.
        #[source]
        source: toml::de::Error,
    },

    /// The object-store endpoint is not an absolute `http(s)` URL.
    #[error("invalid object store endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// The configured endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The request timeout is zero.
    #[error("http timeout must be at least one second")]
    ZeroTimeout,

    /// The object-store region is blank.
    #[error("object store region must not be empty")]
    EmptyRegion,
}

impl TransferConfig {
    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::InvalidEndpoint`] for an unusable endpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use unjar::config::TransferConfig;
    ///
    /// let config = TransferConfig::from_toml_str("[http]\ntimeout_secs = 5\n")?;
    /// assert_eq!(config.http.timeout_secs, 5);
    /// assert_eq!(config.object_store.endpoint, "https://s3.amazonaws.com");
    /// # Ok::<(), unjar::config::ConfigError>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        parse(text, "<inline>")
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] or [`ConfigError::InvalidEndpoint`] when its
    /// contents are invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        parse(&text, path.as_str())
    }

    /// Checks values that TOML typing cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] for a zero request timeout,
    /// [`ConfigError::EmptyRegion`] for a blank region, and
    /// [`ConfigError::InvalidEndpoint`] when the object-store endpoint is not
    /// an absolute `http` or `https` URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.object_store.region.trim().is_empty() {
            return Err(ConfigError::EmptyRegion);
        }
        let endpoint = &self.object_store.endpoint;
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: endpoint.clone(),
            reason,
        };
        let url = url::Url::parse(endpoint).map_err(|err| invalid(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }

    /// Applies [`ENDPOINT_ENV`], [`TIMEOUT_ENV`], and [`REGION_ENV`] (or
    /// [`AWS_REGION_ENV`]) from the process environment.
    ///
    /// Blank values are ignored. A timeout that is not a whole number of
    /// seconds is ignored with a warning.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        if let Some(endpoint) = present(ENDPOINT_ENV) {
            self.object_store.endpoint = endpoint;
        }
        if let Some(region) = present(REGION_ENV).or_else(|| present(AWS_REGION_ENV)) {
            self.object_store.region = region;
        }
        if let Some(timeout) = present(TIMEOUT_ENV) {
            match timeout.parse() {
                Ok(secs) => self.http.timeout_secs = secs,
                Err(err) => log::warn!(
                    target: LOG_TARGET,
                    "ignoring {TIMEOUT_ENV}={timeout:?}: {err}"
                ),
            }
        }
        self
    }
}

fn parse(text: &str, origin: &str) -> Result<TransferConfig, ConfigError> {
    let config: TransferConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
        origin: origin.to_owned(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}
