//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and applying environment overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use elmafdein_library::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("library.toml")).unwrap();
//! println!("Serving on port {}", config.server.port);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, BrowserEngine, CacheConfig, Config, RateLimitConfig, ScraperConfig,
    ServerConfig, SiteConfig, SitesConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, apply_overrides, compute_config_hash, load_config, load_config_with_hash,
    parse_config,
};
pub use validation::validate;
