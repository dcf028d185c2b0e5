use crate::config::types::{
    CacheConfig, Config, RateLimitConfig, ScraperConfig, ServerConfig, SiteConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_cache_config(&config.cache)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_site("coptic", &config.sites.coptic)?;
    validate_site("christianlib", &config.sites.christianlib)?;
    Ok(())
}

/// Validates HTTP API configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation("host cannot be empty".to_string()));
    }

    if config.service_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "service_name cannot be empty".to_string(),
        ));
    }

    if config.report_capacity < 1 {
        return Err(ConfigError::Validation(
            "report_capacity must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_secs < 1 || config.navigation_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_secs must be between 1 and 120, got {}",
            config.navigation_timeout_secs
        )));
    }

    if config.retry_attempts < 1 || config.retry_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be between 1 and 10, got {}",
            config.retry_attempts
        )));
    }

    if config.delay_min_ms > config.delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "delay_min_ms ({}) must not exceed delay_max_ms ({})",
            config.delay_min_ms, config.delay_max_ms
        )));
    }

    if config.delay_max_ms > 10_000 {
        return Err(ConfigError::Validation(format!(
            "delay_max_ms must be <= 10000ms, got {}ms",
            config.delay_max_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
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

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_hours < 1 {
        return Err(ConfigError::Validation(
            "ttl_hours must be >= 1".to_string(),
        ));
    }

    if config.schema_version.trim().is_empty() || config.schema_version.contains('|') {
        return Err(ConfigError::Validation(format!(
            "schema_version must be non-empty and must not contain '|', got '{}'",
            config.schema_version
        )));
    }

    Ok(())
}

/// Validates rate limiter configuration
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.max_requests > 0 && config.window_secs < 1 {
        return Err(ConfigError::Validation(
            "window_secs must be >= 1 when rate limiting is enabled".to_string(),
        ));
    }

    Ok(())
}

/// Validates a target site entry
fn validate_site(name: &str, config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid base_url for {}: {}", name, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url for {} must use http or https, got '{}'",
            name,
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url for {} has no host",
            name
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
