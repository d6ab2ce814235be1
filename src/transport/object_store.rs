//! S3-compatible object-store transport.
//!
//! Objects are addressed path-style as `<endpoint>/<bucket>/<key>`. With
//! credentials attached, every request goes to a SigV4 presigned URL built by
//! `rusty-s3`; without them requests are sent unsigned, which suits public
//! buckets and gateways that accept anonymous access.

use std::fmt;
use std::time::Duration;

use camino::Utf8Path;
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use unjar_common::LOG_TARGET;
use url::Url;

use super::{Transport, TransportError, download_to_file, map_ureq_error, open_upload, unsupported};
use crate::locator::Locator;

/// How long a presigned request URL stays valid.
const PRESIGN_TTL: Duration = Duration::from_secs(60 * 60);

/// Fetches and stores objects through an S3-compatible HTTP endpoint.
#[derive(Clone)]
pub struct ObjectStoreTransport {
    agent: ureq::Agent,
    user_agent: String,
    endpoint: Url,
    signing: Option<Signing>,
}

#[derive(Clone)]
struct Signing {
    credentials: Credentials,
    region: String,
}

#[derive(Clone, Copy)]
enum Access {
    Read,
    Write,
}

impl ObjectStoreTransport {
    /// Wraps a configured agent and validates the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] when `endpoint` is not an
    /// absolute, hierarchical URL.
    pub fn new(
        agent: ureq::Agent,
        user_agent: String,
        endpoint: &str,
    ) -> Result<Self, TransportError> {
        let parsed = Url::parse(endpoint).map_err(|e| TransportError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(TransportError::InvalidEndpoint {
                endpoint: endpoint.to_owned(),
                reason: "endpoint must be a hierarchical URL".to_owned(),
            });
        }
        Ok(Self {
            agent,
            user_agent,
            endpoint: parsed,
            signing: None,
        })
    }

    /// Signs every subsequent request with `credentials` for `region`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rusty_s3::Credentials;
    /// use unjar::transport::ObjectStoreTransport;
    ///
    /// let transport = ObjectStoreTransport::new(
    ///     ureq::Agent::new_with_defaults(),
    ///     "unjar".to_owned(),
    ///     "https://s3.amazonaws.com",
    /// )?
    /// .with_credentials(Credentials::new("AKIDEXAMPLE", "secret"), "eu-west-1");
    /// assert!(transport.is_signed());
    /// # Ok::<(), unjar::transport::TransportError>(())
    /// ```
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials, region: impl Into<String>) -> Self {
        self.signing = Some(Signing {
            credentials,
            region: region.into(),
        });
        self
    }

    /// Returns `true` when requests are presigned.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signing.is_some()
    }

    /// Builds the unsigned request URL for `bucket`/`key`, percent-encoding
    /// segments.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] if the endpoint cannot
    /// carry path segments.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url, TransportError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidEndpoint {
                endpoint: self.endpoint.to_string(),
                reason: "endpoint cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .push(bucket)
            .extend(key.split('/'));
        Ok(url)
    }

    fn request_url(&self, locator: &Locator, access: Access) -> Result<Url, TransportError> {
        let Locator::ObjectStore { bucket, key } = locator else {
            return Err(unsupported(locator, "object store"));
        };
        match &self.signing {
            Some(signing) => signing.presign(&self.endpoint, bucket, key, access),
            None => self.object_url(bucket, key),
        }
    }
}

impl Signing {
    fn presign(&self, endpoint: &Url, bucket: &str, key: &str, access: Access) -> Result<Url, TransportError> {
        let store = Bucket::new(
            directory_url(endpoint),
            UrlStyle::Path,
            bucket.to_owned(),
            self.region.clone(),
        )
        .map_err(|err| TransportError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        })?;
        let credentials = Some(&self.credentials);
        Ok(match access {
            Access::Read => store.get_object(credentials, key).sign(PRESIGN_TTL),
            Access::Write => store.put_object(credentials, key).sign(PRESIGN_TTL),
        })
    }
}

/// Ends the endpoint path with `/` so bucket paths nest under any prefix.
fn directory_url(endpoint: &Url) -> Url {
    let mut base = endpoint.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

impl fmt::Debug for ObjectStoreTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("region", &self.signing.as_ref().map(|signing| signing.region.as_str()))
            .finish_non_exhaustive()
    }
}

impl Transport for ObjectStoreTransport {
    fn fetch(&self, source: &Locator, dest: &Utf8Path) -> Result<(), TransportError> {
        let url = self.request_url(source, Access::Read)?;
        let label = redacted(&url);
        download_to_file(&self.agent, &self.user_agent, url.as_str(), label.as_str(), dest)
    }

    fn push(&self, source: &Utf8Path, dest: &Locator) -> Result<(), TransportError> {
        let url = self.request_url(dest, Access::Write)?;
        // S3 rejects chunked uploads, so the body length is sent up front.
        let (file, len) = open_upload(source)?;
        log::trace!(target: LOG_TARGET, "PUT {} ({len} bytes)", redacted(&url));
        self.agent
            .put(url.as_str())
            .header("User-Agent", self.user_agent.as_str())
            .header("Content-Length", len.to_string())
            .send(file)
            .map_err(|e| map_ureq_error(redacted(&url).as_str(), &e))?;
        Ok(())
    }
}

/// Drops the query string, which carries the signature of presigned URLs.
fn redacted(url: &Url) -> Url {
    let mut bare = url.clone();
    bare.set_query(None);
    bare
}
