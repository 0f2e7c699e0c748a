use futures::StreamExt;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default cap on a feed body (10MB).
pub const DEFAULT_MAX_FEED_BYTES: usize = 10 * 1024 * 1024;
/// Default whole-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_REDIRECTS: usize = 3;

/// Failure to retrieve a feed body.
///
/// The variants only describe what went wrong; callers treat them all the
/// same way (the load fails and the previous view stays on screen).
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Network-level error (DNS, connection, TLS, redirect policy, etc.)
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
    /// Request exceeded the client timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    Status(u16),
    /// Response body exceeded the configured size limit
    #[error("Response too large (limit {limit} bytes)")]
    TooLarge { limit: usize },
    /// Fewer bytes arrived than Content-Length announced
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    Incomplete { expected: u64, received: usize },
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            NetworkError::Timeout
        } else {
            NetworkError::Request(e)
        }
    }
}

/// Retrieves raw feed documents over HTTP.
///
/// One call to [`Fetcher::fetch`] issues exactly one GET (plus any redirects
/// the client follows). There is no retry here; a failed fetch is reported
/// and it is up to the caller whether to try again.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl Fetcher {
    /// Build a fetcher with its own HTTP client.
    ///
    /// `timeout` bounds the whole request including the body; hitting it
    /// yields [`NetworkError::Timeout`].
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .redirect(redirect_policy())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .map_err(NetworkError::Request)?;

        Ok(Self { client, max_bytes })
    }

    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>, NetworkError> {
        tracing::debug!(url = %url, "Fetching feed");

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Feed request returned error status");
            return Err(NetworkError::Status(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, self.max_bytes).await?;
        tracing::debug!(url = %url, bytes = bytes.len(), "Feed fetched");
        Ok(bytes)
    }
}

/// Follow at most three redirects and refuse loops.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, NetworkError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(NetworkError::TooLarge { limit });
        }
    }

    let mut bytes = Vec::with_capacity(expected_length.unwrap_or(0) as usize);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(NetworkError::TooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(NetworkError::Incomplete {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>Test</title><link>https://example.com/1</link></item>
</channel></rss>"#;

    fn fetcher() -> Fetcher {
        Fetcher::new(Duration::from_secs(5), DEFAULT_MAX_FEED_BYTES).unwrap()
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_returns_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let body = fetcher().fetch(&url(&mock_server, "/feed")).await.unwrap();
        assert_eq!(body, VALID_RSS.as_bytes());
    }

    #[tokio::test]
    async fn test_fetch_404_is_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        match fetcher().fetch(&url(&mock_server, "/feed")).await {
            Err(NetworkError::Status(404)) => {}
            other => panic!("Expected Status(404), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_500_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = fetcher().fetch(&url(&mock_server, "/feed")).await;
        assert!(matches!(result, Err(NetworkError::Status(500))));
    }

    #[tokio::test]
    async fn test_fetch_body_over_limit_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
            .mount(&mock_server)
            .await;

        let small = Fetcher::new(Duration::from_secs(5), 1024).unwrap();
        match small.fetch(&url(&mock_server, "/feed")).await {
            Err(NetworkError::TooLarge { limit: 1024 }) => {}
            other => panic!("Expected TooLarge, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout_maps_to_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let impatient = Fetcher::new(Duration::from_millis(100), DEFAULT_MAX_FEED_BYTES).unwrap();
        match impatient.fetch(&url(&mock_server, "/feed")).await {
            Err(NetworkError::Timeout) => {}
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_fails() {
        // Port 9 (discard) on loopback is closed in test environments
        let unreachable = Url::parse("http://127.0.0.1:9/feed").unwrap();
        assert!(fetcher().fetch(&unreachable).await.is_err());
    }
}
