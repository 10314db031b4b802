//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, Response};
use tracing::{debug, error};
use url::Url;

use crate::errors::{ClientError, DeployerError};

/// HTTP client for Nomad API communication
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client. Every call is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeployerError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            DeployerError::ConfigError(format!("invalid Nomad URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DeployerError::ConfigError(format!(
                "invalid Nomad URL '{}': not a base URL",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Make a GET request and return the raw response body
    pub async fn get_bytes(&self, url: Url, operation: &'static str) -> Result<Vec<u8>, ClientError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = check_status(response, "GET", operation).await?;

        Ok(response.bytes().await?.to_vec())
    }

    /// Make a POST request with an already encoded JSON body
    pub async fn post_json(
        &self,
        url: Url,
        body: Vec<u8>,
        operation: &'static str,
    ) -> Result<(), ClientError> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        check_status(response, "POST", operation).await?;

        Ok(())
    }
}

async fn check_status(
    response: Response,
    method: &str,
    operation: &'static str,
) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    error!("HTTP {} failed: {} - {}", method, status, body);
    Err(ClientError::Status {
        status,
        operation,
        body,
    })
}
