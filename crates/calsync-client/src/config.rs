//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calsync/config.toml` by default.
//!
//! Credential values (`username`, `password`) support secret references:
//! - `pass::path/in/store`, resolved via `pass show`
//! - `env::VAR_NAME`, read from the environment
//! - anything else is used as written
//!
//! Store settings missing from the file fall back to `CALSYNC_URL`,
//! `CALSYNC_USERNAME` and `CALSYNC_PASSWORD`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use calsync_store::{FetchMode, StoreConfig};

/// Environment variable holding the collection URL.
pub const URL_ENV: &str = "CALSYNC_URL";
/// Environment variable holding the username.
pub const USERNAME_ENV: &str = "CALSYNC_USERNAME";
/// Environment variable holding the password.
pub const PASSWORD_ENV: &str = "CALSYNC_PASSWORD";

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the calsync client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Remote store settings.
    #[serde(default)]
    pub store: StoreSettings,

    /// Display settings.
    #[serde(default)]
    pub display: DisplaySettings,
}

/// Settings for the CalDAV collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Collection URL.
    pub url: Option<String>,

    /// Username (supports `pass::` and `env::` prefixes).
    pub username: Option<String>,

    /// Password (supports `pass::` and `env::` prefixes).
    pub password: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// How the collection is read: `get` or `report`.
    pub fetch_mode: String,

    /// Whether TLS certificates are verified.
    pub verify_tls: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            timeout_secs: StoreConfig::DEFAULT_TIMEOUT_SECS,
            fetch_mode: FetchMode::default().to_string(),
            verify_tls: true,
        }
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// `strftime` pattern used for event times.
    pub date_format: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Fills unset store settings from `CALSYNC_*` environment variables.
    pub fn with_env_fallbacks(self) -> Self {
        self.with_fallbacks(|key| std::env::var(key).ok())
    }

    /// Fills unset store settings from `lookup`.
    pub fn with_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let store = &mut self.store;
        if store.url.is_none() {
            store.url = lookup(URL_ENV);
        }
        if store.username.is_none() {
            store.username = lookup(USERNAME_ENV);
        }
        if store.password.is_none() {
            store.password = lookup(PASSWORD_ENV);
        }
        self
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calsync")
    }
}

impl StoreSettings {
    /// Builds the store configuration.
    ///
    /// Resolves credentials (expanding `pass::` / `env::` references). A
    /// username without a password, or the reverse, is an error.
    pub fn to_store_config(&self) -> Result<StoreConfig, String> {
        let url = self.url.as_deref().ok_or_else(|| {
            format!(
                "no calendar URL configured. Add to {}:\n  \
                 [store]\n  \
                 url = \"https://dav.example.com/calendars/me/work/\"\n\n  \
                 Or set {}",
                ClientConfig::default_path().display(),
                URL_ENV
            )
        })?;

        let fetch_mode: FetchMode = self.fetch_mode.parse()?;

        let mut config = StoreConfig::new(url)
            .map_err(|e| format!("invalid calendar URL `{}`: {}", url, e))?
            .with_fetch_mode(fetch_mode)
            .with_timeout(Duration::from_secs(self.timeout_secs));

        if !self.verify_tls {
            config = config.with_insecure_tls();
        }

        if let Some((username, password)) = self.resolve_credentials()? {
            config = config.with_credentials(username, password);
        }

        Ok(config)
    }

    /// Resolves the credential pair, if any.
    pub(crate) fn resolve_credentials(&self) -> Result<Option<(String, String)>, String> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (None, None) => Ok(None),
            (Some(_), None) => {
                Err("password is missing from [store] section in config.toml".to_string())
            }
            (None, Some(_)) => {
                Err("username is missing from [store] section in config.toml".to_string())
            }
            (Some(raw_user), Some(raw_password)) => {
                let username = crate::secret::resolve(raw_user)
                    .map_err(|e| format!("failed to resolve username: {}", e))?;
                let password = crate::secret::resolve(raw_password)
                    .map_err(|e| format!("failed to resolve password: {}", e))?;
                Ok(Some((username, password)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert!(config.store.url.is_none());
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.store.fetch_mode, "get");
        assert!(config.store.verify_tls);
        assert_eq!(config.display.date_format, "%Y-%m-%d %H:%M");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[store]
url = "https://dav.example.com/cal"
username = "ana"
password = "secret"
fetch_mode = "report"
timeout_secs = 10

[display]
date_format = "%H:%M"
"#
        )
        .unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.store.url.as_deref(), Some("https://dav.example.com/cal"));
        assert_eq!(config.display.date_format, "%H:%M");

        let store = config.store.to_store_config().unwrap();
        assert_eq!(store.url_str(), "https://dav.example.com/cal/");
        assert_eq!(store.fetch_mode, FetchMode::Report);
        assert_eq!(store.timeout, Duration::from_secs(10));
        assert!(store.has_credentials());
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::load_from(&dir.path().join("absent.toml"));
        assert!(result.unwrap_err().contains("failed to read config"));
    }

    #[test]
    fn load_from_invalid_toml_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\nurl =").unwrap();
        let result = ClientConfig::load_from(file.path());
        assert!(result.unwrap_err().contains("failed to parse config"));
    }

    #[test]
    fn fallbacks_fill_only_unset_values() {
        let config = ClientConfig {
            store: StoreSettings {
                url: Some("https://file.example.com/".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
        .with_fallbacks(|key| match key {
            URL_ENV => Some("https://env.example.com/".to_string()),
            USERNAME_ENV => Some("env-user".to_string()),
            _ => None,
        });

        assert_eq!(config.store.url.as_deref(), Some("https://file.example.com/"));
        assert_eq!(config.store.username.as_deref(), Some("env-user"));
        assert!(config.store.password.is_none());
    }

    #[test]
    fn missing_url_errors() {
        let result = StoreSettings::default().to_store_config();
        assert!(result.unwrap_err().contains("no calendar URL configured"));
    }

    #[test]
    fn invalid_fetch_mode_errors() {
        let settings = StoreSettings {
            url: Some("https://dav.example.com/".to_string()),
            fetch_mode: "propfind".to_string(),
            ..Default::default()
        };
        assert!(settings.to_store_config().is_err());
    }

    #[test]
    fn half_credentials_error() {
        let settings = StoreSettings {
            url: Some("https://dav.example.com/".to_string()),
            username: Some("ana".to_string()),
            ..Default::default()
        };
        assert!(settings.to_store_config().unwrap_err().contains("password"));
    }

    #[test]
    fn credentials_resolve_env_references() {
        unsafe {
            std::env::set_var("_CALSYNC_TEST_PASSWORD", "from-env");
        }

        let settings = StoreSettings {
            username: Some("ana".to_string()),
            password: Some("env::_CALSYNC_TEST_PASSWORD".to_string()),
            ..Default::default()
        };
        let creds = settings.resolve_credentials().unwrap();
        assert_eq!(creds, Some(("ana".to_string(), "from-env".to_string())));

        unsafe {
            std::env::remove_var("_CALSYNC_TEST_PASSWORD");
        }
    }

    #[test]
    fn no_credentials_is_anonymous() {
        let settings = StoreSettings {
            url: Some("https://dav.example.com/".to_string()),
            ..Default::default()
        };
        let store = settings.to_store_config().unwrap();
        assert!(!store.has_credentials());
    }
}
