//! HTTP(S) transport.

use std::fmt;

use camino::Utf8Path;
use unjar_common::LOG_TARGET;

use super::{Transport, TransportError, download_to_file, map_ureq_error, open_upload, unsupported};
use crate::locator::Locator;

/// Content type sent with uploads.
const UPLOAD_CONTENT_TYPE: &str = "application/binary";

/// Fetches with `GET` and uploads with `POST`.
#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpTransport {
    /// Wraps a configured agent.
    #[must_use]
    pub fn new(agent: ureq::Agent, user_agent: String) -> Self {
        Self { agent, user_agent }
    }

    fn url_of<'a>(locator: &'a Locator) -> Result<&'a str, TransportError> {
        match locator {
            Locator::Http { url } | Locator::Https { url } => Ok(url.as_str()),
            other => Err(unsupported(other, "http")),
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, source: &Locator, dest: &Utf8Path) -> Result<(), TransportError> {
        let url = Self::url_of(source)?;
        download_to_file(&self.agent, &self.user_agent, url, url, dest)
    }

    fn push(&self, source: &Utf8Path, dest: &Locator) -> Result<(), TransportError> {
        let url = Self::url_of(dest)?;
        let (file, len) = open_upload(source)?;
        log::trace!(target: LOG_TARGET, "POST {url} ({len} bytes)");
        self.agent
            .post(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Content-Type", UPLOAD_CONTENT_TYPE)
            .header("Content-Length", len.to_string())
            .send(file)
            .map_err(|e| map_ureq_error(url, &e))?;
        Ok(())
    }
}
