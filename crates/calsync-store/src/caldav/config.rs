//! Remote store configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use calsync_core::event::RESOURCE_SUFFIX;

use crate::error::{StoreError, StoreResult};

/// How the collection is fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain GET on the collection URL; the body is iCalendar text.
    #[default]
    Get,
    /// CalDAV `calendar-query` REPORT; one calendar object per resource,
    /// each with its own ETag.
    Report,
}

impl FetchMode {
    /// Returns the configuration name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "report" => Ok(Self::Report),
            other => Err(format!(
                "unknown fetch mode '{}' (expected 'get' or 'report')",
                other
            )),
        }
    }
}

/// Configuration for the remote event store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Collection URL, always ending with `/`.
    pub url: Url,

    /// Username for Basic authentication.
    pub username: Option<String>,

    /// Password for Basic authentication.
    pub password: Option<String>,

    /// How the collection is fetched.
    pub fetch_mode: FetchMode,

    /// Whether to verify TLS certificates.
    pub verify_tls: bool,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl StoreConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration for the collection at `url`.
    ///
    /// A trailing `/` is appended to the path when missing, so resource
    /// names resolve inside the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let mut parsed = Url::parse(url.as_ref())?;
        if !parsed.path().ends_with('/') {
            let path = format!("{}/", parsed.path());
            parsed.set_path(&path);
        }
        Ok(Self {
            url: parsed,
            username: None,
            password: None,
            fetch_mode: FetchMode::default(),
            verify_tls: true,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calsync/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the credentials for authentication.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the fetch mode.
    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.fetch_mode = mode;
        self
    }

    /// Disables TLS verification (for testing only).
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the collection URL as a string.
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns true if credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Returns the URL of the resource holding event `id`.
    ///
    /// The id is percent-encoded as a single path segment.
    pub fn resource_url(&self, id: &str) -> StoreResult<Url> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::configuration(format!("'{}' cannot hold resources", self.url))
            })?
            .pop_if_empty()
            .push(&format!("{}{}", id, RESOURCE_SUFFIX));
        Ok(url)
    }
}
