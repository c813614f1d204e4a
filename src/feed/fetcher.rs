use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while downloading a document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code (only checked where asked for)
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
}

/// Limits applied to every request made during a run.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    pub timeout: Option<Duration>,
    pub max_bytes: usize,
}

/// Downloads the feed document.
///
/// The HTTP status is not inspected: whatever body the server
/// returns is handed to the parser, which rejects it if it is not XML.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    limits: FetchLimits,
) -> Result<Vec<u8>, FetchError> {
    with_timeout(limits.timeout, async {
        let response = client.get(url).send().await?;

        tracing::debug!(
            feed = %url,
            status = %response.status(),
            "Feed response received"
        );

        read_limited_bytes(response, limits.max_bytes).await
    })
    .await
}

/// Downloads an HTML page as text, sending `user_agent`.
///
/// Unlike [`fetch_feed`], non-2xx responses are errors here.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    user_agent: &str,
    limits: FetchLimits,
) -> Result<String, FetchError> {
    let bytes = with_timeout(limits.timeout, async {
        let response = client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        read_limited_bytes(response, limits.max_bytes).await
    })
    .await?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Bounds a whole download (connect, headers and body) by `timeout`.
async fn with_timeout<T>(
    timeout: Option<Duration>,
    download: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, download)
            .await
            .map_err(|_| FetchError::Timeout(limit))?,
        None => download.await,
    };

    // A client-level timeout surfaces as a reqwest error
    match (result, timeout) {
        (Err(FetchError::Network(e)), Some(limit)) if e.is_timeout() => {
            Err(FetchError::Timeout(limit))
        }
        (result, _) => result,
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
