//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Placeholder printed instead of a plain-text password.
const MASK: &str = "********";

/// Dump the current configuration to stdout.
///
/// Plain-text passwords are masked; secret references are shown as written.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&masked(config))
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", ClientConfig::default_path().display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    let store = config
        .store
        .to_store_config()
        .map_err(|e| ClientError::Config(format!("invalid [store] settings: {}", e)))?;

    if store.has_credentials() {
        println!("Store credentials resolved.");
    }
    if !store.verify_tls {
        println!("warning: TLS certificate verification is disabled");
    }
    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    println!("config: {}", ClientConfig::default_path().display());
    Ok(())
}

fn masked(config: &ClientConfig) -> ClientConfig {
    let mut config = config.clone();
    if let Some(ref password) = config.store.password
        && !secret::is_reference(password)
    {
        config.store.password = Some(MASK.to_string());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_password_is_masked() {
        let mut config = ClientConfig::default();
        config.store.password = Some("hunter2".to_string());
        assert_eq!(masked(&config).store.password.as_deref(), Some(MASK));
    }

    #[test]
    fn reference_is_kept() {
        let mut config = ClientConfig::default();
        config.store.password = Some("pass::dav/work".to_string());
        assert_eq!(
            masked(&config).store.password.as_deref(),
            Some("pass::dav/work")
        );
    }

    #[test]
    fn validate_requires_url() {
        assert!(matches!(
            validate(&ClientConfig::default()),
            Err(ClientError::Config(_))
        ));
    }
}
