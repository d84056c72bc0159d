use std::borrow::Cow;
use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;

use super::model::Feed;
use super::parser::{parse_bytes, DocumentError};
use crate::config::FetchConfig;
use crate::util::{validate_url, UrlValidationError};

/// Errors that can occur while retrieving a feed over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL was rejected before any request was made
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The exchange exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
}

/// Error returned by [`FeedReader::parse_url`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// The body was retrieved but is not a usable RSS document
    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] DocumentError),
    /// The body could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A feed parsed from a URL, along with the response body it came from.
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    pub feed: Feed,
    /// Response body exactly as received, before any transcoding
    pub raw: Vec<u8>,
}

impl FetchedFeed {
    /// The raw body as text, with invalid UTF-8 replaced.
    pub fn raw_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

/// Fetches and parses feeds over HTTP.
///
/// Each call to [`parse_url`](Self::parse_url) issues exactly one GET request,
/// without retries or caching. Clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct FeedReader {
    client: reqwest::Client,
    timeout: Duration,
    max_feed_bytes: usize,
    block_private_hosts: bool,
}

impl FeedReader {
    /// Builds a reader with its own HTTP client configured from `config`.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Builds a reader around an existing client (caller controls configuration).
    ///
    /// The timeout, size limit and host policy still come from `config`.
    pub fn with_client(client: reqwest::Client, config: &FetchConfig) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
            max_feed_bytes: config.max_feed_bytes,
            block_private_hosts: config.block_private_hosts,
        }
    }

    /// Fetches `url` and parses the response body as an RSS document.
    ///
    /// The body's encoding is detected from its BOM or XML declaration, then
    /// from the `Content-Type` charset. On success the verbatim body is
    /// returned alongside the parsed feed.
    ///
    /// # Errors
    ///
    /// - [`ReadError::Fetch`] with [`FetchError::InvalidUrl`] - URL is not http(s)
    /// - [`ReadError::Fetch`] with [`FetchError::Network`] - connection or TLS errors
    /// - [`ReadError::Fetch`] with [`FetchError::Timeout`] - the configured timeout elapsed
    /// - [`ReadError::Fetch`] with [`FetchError::HttpStatus`] - non-2xx response
    /// - [`ReadError::Fetch`] with [`FetchError::ResponseTooLarge`] - body over the size limit
    /// - [`ReadError::MalformedDocument`] - the body is not a parseable RSS document
    pub async fn parse_url(&self, url: &str) -> Result<FetchedFeed, ReadError> {
        let validated = validate_url(url, self.block_private_hosts).map_err(FetchError::from)?;

        let (raw, content_type) = tokio::time::timeout(self.timeout, self.fetch(validated.as_str()))
            .await
            .map_err(|_| FetchError::Timeout)??;

        let feed = parse_bytes(&raw, content_type.as_deref())?;
        Ok(FetchedFeed { feed, raw })
    }

    /// Issues the GET and returns the body along with its `Content-Type`.
    async fn fetch(&self, url: &str) -> Result<(Vec<u8>, Option<String>), FetchError> {
        tracing::debug!(url = %url, "Fetching feed");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = %status, "Feed request failed");
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = read_limited_bytes(response, self.max_feed_bytes).await?;
        tracing::debug!(
            url = %url,
            status = %status,
            bytes = bytes.len(),
            "Feed fetched"
        );
        Ok((bytes, content_type))
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    ensure_complete(expected_length, bytes.len())?;
    Ok(bytes)
}

/// Fails when fewer bytes arrived than the `Content-Length` advertised.
fn ensure_complete(expected: Option<u64>, received: usize) -> Result<(), FetchError> {
    match expected {
        Some(expected) if (received as u64) < expected => {
            Err(FetchError::IncompleteResponse { expected, received })
        }
        _ => Ok(()),
    }
}
