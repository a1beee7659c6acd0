use crate::config::types::{Config, CrawlerConfig, TransportConfig};
use crate::extract::Patterns;
use crate::link::Scheme;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_transport_config(&config.transport)?;
    Patterns::new(&config.patterns)?;

    if config.shutdown.grace_period_ms == 0 {
        return Err(ConfigError::Validation(
            "grace-period-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = config
        .seed
        .as_deref()
        .ok_or_else(|| ConfigError::Validation("a seed URL is required".to_string()))?;
    validate_seed(seed)?;

    if config.threads < 1 {
        return Err(ConfigError::Validation(format!(
            "threads must be >= 1, got {}",
            config.threads
        )));
    }

    if let Some(depth) = config.depth {
        if !config.recursive {
            return Err(ConfigError::Validation(
                "depth can only be set together with recursive".to_string(),
            ));
        }

        if depth < 1 {
            return Err(ConfigError::Validation(format!(
                "depth must be >= 1, got {}",
                depth
            )));
        }
    }

    Ok(())
}

/// Validates the seed URL
///
/// The scheme check is a literal prefix check, the same one the transport
/// uses; the URL must also parse and carry a host.
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    if Scheme::of(seed).is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must start with http:// or https://",
            seed
        )));
    }

    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

/// Validates transport configuration
fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.connect_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-ms must be > 0".to_string(),
        ));
    }

    Ok(())
}
