//! HTTP client for the remote store.
//!
//! This module provides the low-level client that handles:
//! - Basic authentication on every request
//! - GET, PUT, DELETE and REPORT
//! - Mapping response statuses onto store error codes

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, ETAG};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, trace};
use url::Url;

use crate::error::{StoreError, StoreErrorCode, StoreResult};

use super::auth::basic_auth;
use super::config::StoreConfig;

/// Content type of every PUT body.
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Content type of REPORT bodies.
const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// A fetched body together with the response's ETag, if any.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// The response body.
    pub body: String,
    /// The `ETag` header exactly as sent, quotes and weak prefix included.
    pub etag: Option<String>,
}

/// HTTP client for store operations.
pub struct CalDavClient {
    client: Client,
    config: StoreConfig,
}

impl CalDavClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                StoreError::configuration(format!("Failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { client, config })
    }

    /// Performs a GET request.
    ///
    /// Any non-success status is a `NetworkError`.
    pub async fn get(&self, url: &Url) -> StoreResult<Fetched> {
        let response = self.send(self.request(Method::GET, url)).await?;
        let response = check_status(response, StoreErrorCode::NetworkError).await?;

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let body = read_body(response).await?;

        Ok(Fetched { body, etag })
    }

    /// Performs a PUT request with an iCalendar body.
    ///
    /// Any non-success status is a `StoreWriteError`.
    pub async fn put(&self, url: &Url, body: String) -> StoreResult<()> {
        let request = self
            .request(Method::PUT, url)
            .header(CONTENT_TYPE, CALENDAR_CONTENT_TYPE)
            .body(body);
        let response = self.send(request).await?;
        check_status(response, StoreErrorCode::StoreWriteError).await?;
        Ok(())
    }

    /// Performs a DELETE request.
    ///
    /// Any non-success status is a `StoreDeleteWarning`.
    pub async fn delete(&self, url: &Url) -> StoreResult<()> {
        let response = self.send(self.request(Method::DELETE, url)).await?;
        check_status(response, StoreErrorCode::StoreDeleteWarning).await?;
        Ok(())
    }

    /// Performs a REPORT request with depth 1.
    ///
    /// Used for calendar-query.
    pub async fn report(&self, url: &Url, body: String) -> StoreResult<String> {
        let method = Method::from_bytes(b"REPORT")
            .map_err(|e| StoreError::internal("Invalid HTTP method: REPORT").with_source(e))?;
        let request = self
            .request(method, url)
            .header(CONTENT_TYPE, XML_CONTENT_TYPE)
            .header("Depth", "1")
            .body(body);
        let response = self.send(request).await?;
        let response = check_status(response, StoreErrorCode::NetworkError).await?;
        read_body(response).await
    }

    /// Starts a request, attaching credentials when configured.
    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        trace!(method = %method, url = %url, "Preparing request");
        let request = self.client.request(method, url.clone());
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                request.header(AUTHORIZATION, basic_auth(username, password))
            }
            _ => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        request.send().await.map_err(|e| {
            StoreError::network(format!("Request failed: {}", e)).with_source(e)
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// Passes 2xx responses through and turns anything else into an error
/// with the given code.
async fn check_status(response: Response, code: StoreErrorCode) -> StoreResult<Response> {
    let status = response.status();
    trace!(status = %status, "Received response");

    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, url = %url, body = %body, "Request rejected");

    Err(StoreError::new(code, describe_status(status, &url)).with_status(status.as_u16()))
}

fn describe_status(status: StatusCode, url: &str) -> String {
    match status {
        StatusCode::UNAUTHORIZED => format!("Authentication failed for {}", url),
        StatusCode::FORBIDDEN => format!("Access denied to {}", url),
        StatusCode::NOT_FOUND => format!("{} not found", url),
        s if s.is_server_error() => format!("Server error ({}) for {}", s, url),
        s => format!("Unexpected status {} for {}", s, url),
    }
}

async fn read_body(response: Response) -> StoreResult<String> {
    response.text().await.map_err(|e| {
        StoreError::network(format!("Failed to read response: {}", e)).with_source(e)
    })
}
