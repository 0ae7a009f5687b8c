//! Configuration module for Price-Sweep
//!
//! Configuration is static: the built-in defaults describe the reference
//! catalog site, and an optional TOML file overrides any section of it.
//!
//! # Example
//!
//! ```no_run
//! use price_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Fetch timeout: {}ms", config.crawler.timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FieldSelector, OutputConfig, SelectorConfig, SiteConfig,
    UserAgentConfig,
};
pub use types::{
    DEFAULT_BASE_URL, DEFAULT_PRODUCT_PATTERN, DEFAULT_SEED_PATH, IMAGE_ATTRIBUTE,
    IMAGE_SELECTOR, ITEM_NAME_ATTRIBUTE, ITEM_NAME_SELECTOR, PRICE_SELECTOR,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
