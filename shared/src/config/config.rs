use std::fs;
use tracing::{debug, error, info};

use crate::types::server_config::{AppConfig, ConfigError};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config = parse_config(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    Ok(config)
}

/// Load from `path` when given, otherwise fall back to built-in defaults.
/// The defaults are validated the same way as a file would be.
pub fn load_or_default(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(p) => load_config(p),
        None => {
            info!("No configuration file given, using defaults");
            let config = AppConfig::default();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

/// Parse and validate a TOML document.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(contents)?;
    validate_config(&config)?;
    info!("Config validated");
    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.bind.is_empty() {
        return Err(ConfigError::InvalidConfig("bind cannot be empty".into()));
    }

    if config.server.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_connections must be greater than 0".into(),
        ));
    }

    if config.server.request_timeout_secs == 0 {
        return Err(ConfigError::InvalidConfig(
            "request_timeout_secs must be greater than 0".into(),
        ));
    }

    let upstream_secs = config.metadata.timeout_secs + config.backend.timeout_secs;
    if config.server.request_timeout_secs <= upstream_secs {
        return Err(ConfigError::InvalidConfig(format!(
            "request_timeout_secs must exceed metadata and backend timeouts combined ({}s)",
            upstream_secs
        )));
    }

    let backend_url = config.backend.resolved_url();
    if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
        return Err(ConfigError::InvalidConfig(format!(
            "backend url must be http(s): {}",
            backend_url
        )));
    }

    if config.session.max_age_days == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_age_days must be greater than 0".into(),
        ));
    }

    if config.feed.page_size == 0 || config.feed.page_size > 500 {
        return Err(ConfigError::InvalidConfig(
            "page_size must be between 1 and 500".into(),
        ));
    }

    if config.metadata.oembed_endpoint.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "oembed_endpoint cannot be empty".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_page_size() {
        let err = parse_config("[feed]\npage_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_session_age() {
        let err = parse_config("[session]\nmax_age_days = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_age_days"));
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn request_timeout_must_cover_upstream_calls() {
        let err = parse_config(
            "[server]\nrequest_timeout_secs = 20\n\n[backend]\ntimeout_secs = 10\n\n[metadata]\ntimeout_secs = 10\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));

        let ok = parse_config(
            "[server]\nrequest_timeout_secs = 21\n\n[backend]\ntimeout_secs = 10\n\n[metadata]\ntimeout_secs = 10\n",
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse_config("[server\nport = 1").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
