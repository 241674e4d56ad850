//! Sequential HTTP fetch facade.
//!
//! All pipeline I/O goes through [`Fetcher`]. Requests are issued one at a
//! time by the caller; attachment deduplication and sequential filename
//! assignment depend on that ordering, so this crate deliberately offers no
//! concurrent fetch helpers.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use serialbind_shared::{Result, SerialbindError};

/// User-Agent string for all requests.
const USER_AGENT: &str = concat!("serialbind/", env!("CARGO_PKG_VERSION"));

/// Fallback when the server does not report a content type.
const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// A fetched binary resource with its reported media type.
#[derive(Debug, Clone)]
pub struct BinaryPayload {
    /// Raw response body.
    pub data: Vec<u8>,
    /// The `Content-Type` header value, e.g. `image/png`.
    pub media_type: String,
}

/// Thin HTTP client for stylesheet, document, and attachment fetches.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a fetcher with the standard client configuration.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SerialbindError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch a text resource (HTML page or stylesheet).
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching text");
        let response = self.get_checked(url).await?;
        response
            .text()
            .await
            .map_err(|e| SerialbindError::Network(format!("{url}: body read failed: {e}")))
    }

    /// Fetch a binary resource, capturing its media type.
    pub async fn fetch_binary(&self, url: &str) -> Result<BinaryPayload> {
        debug!(%url, "fetching binary");
        let response = self.get_checked(url).await?;

        let media_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();

        let data = response
            .bytes()
            .await
            .map_err(|e| SerialbindError::Network(format!("{url}: body read failed: {e}")))?
            .to_vec();

        Ok(BinaryPayload { data, media_type })
    }

    /// Issue a GET and turn non-success statuses into errors naming the URL.
    async fn get_checked(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SerialbindError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SerialbindError::Network(format!("{url}: HTTP {status}")));
        }

        Ok(response)
    }
}
