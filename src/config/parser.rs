use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::str::FromStr;

/// Parses and validates configuration text
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads and validates a configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use elmafdein_library::config::load_config;
///
/// let config = load_config(Path::new("library.toml")).unwrap();
/// println!("Cache TTL: {}h", config.cache.ttl_hours);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Hex SHA-256 of the configuration file content
///
/// Logged at start-up so operators can tell which configuration a running
/// process was started with.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(hash_content(&std::fs::read_to_string(path)?))
}

/// Loads a configuration together with the hash of the exact text parsed
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| {
        ConfigError::Validation(format!("{} has an invalid value: '{}'", key, value))
    })
}

/// Applies overrides from a key lookup, then re-validates
///
/// Recognized keys:
///
/// | Key | Field |
/// |-----|-------|
/// | `RATE_LIMIT_MAX` | `rate-limit.max-requests` |
/// | `RATE_LIMIT_WINDOW_SEC` | `rate-limit.window-secs` |
/// | `LIBRARY_HOST` | `server.host` |
/// | `LIBRARY_PORT` | `server.port` |
/// | `DEBUG` | `1`/`true` runs the browser with a visible window |
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("RATE_LIMIT_MAX") {
        config.rate_limit.max_requests = parse_override("RATE_LIMIT_MAX", &value)?;
    }
    if let Some(value) = lookup("RATE_LIMIT_WINDOW_SEC") {
        config.rate_limit.window_secs = parse_override("RATE_LIMIT_WINDOW_SEC", &value)?;
    }
    if let Some(value) = lookup("LIBRARY_HOST") {
        config.server.host = value.trim().to_string();
    }
    if let Some(value) = lookup("LIBRARY_PORT") {
        config.server.port = parse_override("LIBRARY_PORT", &value)?;
    }
    if let Some(value) = lookup("DEBUG") {
        let debug = matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        if debug {
            config.browser.headless = false;
        }
    }

    validate(config)
}

/// Applies overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    apply_overrides(config, |key| std::env::var(key).ok())
}
