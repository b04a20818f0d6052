use crate::config::types::{
    Config, CrawlerConfig, MediaConfig, PolitenessEntry, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

const MAX_DELAY_SECS: u64 = 3600;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_politeness(&config.politeness)?;
    validate_media_config(&config.media)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.default_delay_secs > MAX_DELAY_SECS {
        return Err(ConfigError::Validation(format!(
            "default_delay_secs must be <= {}, got {}",
            MAX_DELAY_SECS, config.default_delay_secs
        )));
    }

    if config.confirm_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "confirm_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates per-site politeness entries
fn validate_politeness(entries: &[PolitenessEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        validate_domain_pattern(&entry.domain)?;

        if entry.delay_secs > MAX_DELAY_SECS {
            return Err(ConfigError::Validation(format!(
                "Politeness delay for '{}' must be <= {}, got {}",
                entry.domain, MAX_DELAY_SECS, entry.delay_secs
            )));
        }
    }
    Ok(())
}

/// Validates the known extension and hosting-domain lists
fn validate_media_config(config: &MediaConfig) -> Result<(), ConfigError> {
    if config.extensions.is_empty() {
        return Err(ConfigError::Validation(
            "At least one media extension must be configured".to_string(),
        ));
    }

    for extension in &config.extensions {
        if extension.len() < 2 || !extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "Media extension '{}' must start with '.' followed by a suffix",
                extension
            )));
        }
    }

    for tag in &config.hosting_domains {
        if tag.is_empty() {
            return Err(ConfigError::Validation(
                "Hosting-domain tags cannot be empty".to_string(),
            ));
        }

        if tag.chars().any(|c| c.is_uppercase() || c.is_whitespace()) {
            return Err(ConfigError::Validation(format!(
                "Hosting-domain tag '{}' must be lowercase without whitespace",
                tag
            )));
        }
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
