//! Async HTTP client wrapping reqwest.
//!
//! Plain GET requests with a timeout and a bounded redirect chain. No custom
//! headers, no auth, and no retries; a failed request is reported, not
//! papered over.

use std::time::Duration;

use url::Url;

use crate::error::ScrapeResult;

/// HTTP client for page and asset requests.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// GET a URL and return the response body. Transport failures and
    /// non-success status codes both fail the request.
    pub async fn get_bytes(&self, url: &Url) -> ScrapeResult<Vec<u8>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new(Duration::from_secs(10));
        let _ = client;
    }

    #[tokio::test]
    async fn test_get_reports_transport_failure() {
        let client = HttpClient::new(Duration::from_secs(1));
        let url = Url::parse("http://127.0.0.1:1/nothing-listens-here").unwrap();
        assert!(client.get_bytes(&url).await.is_err());
    }
}
