use crate::config::types::{
    Config, CrawlerConfig, FieldSelector, OutputConfig, SelectorConfig, SiteConfig,
    UserAgentConfig,
};
use crate::url::normalize_url;
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_site_config(&config.site)?;
    validate_selector_config(&config.selectors)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site configuration
fn validate_site_config(config: &SiteConfig) -> ConfigResult<()> {
    let base = normalize_url(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if config.seed_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "seed_path cannot be empty".to_string(),
        ));
    }

    base.join(&config.seed_path).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed_path '{}': {}", config.seed_path, e))
    })?;

    if config.product_pattern.trim().is_empty() {
        return Err(ConfigError::Validation(
            "product_pattern cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every field selector is a parseable CSS selector
fn validate_selector_config(config: &SelectorConfig) -> ConfigResult<()> {
    validate_field_selector("item-name", &config.item_name)?;
    validate_field_selector("price", &config.price)?;
    validate_field_selector("image", &config.image)?;
    Ok(())
}

fn validate_field_selector(field: &str, selector: &FieldSelector) -> ConfigResult<()> {
    Selector::parse(&selector.css).map_err(|e| {
        ConfigError::InvalidSelector(format!("{} selector '{}': {:?}", field, selector.css, e))
    })?;

    if let Some(attribute) = &selector.attribute {
        if attribute.trim().is_empty() {
            return Err(ConfigError::InvalidSelector(format!(
                "{} selector has an empty attribute name",
                field
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout_ms must be >= 100ms, got {}ms",
            config.timeout_ms
        )));
    }

    if config.retries > 10 {
        return Err(ConfigError::Validation(format!(
            "retries must be <= 10, got {}",
            config.retries
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.expected_products == Some(0) {
        return Err(ConfigError::Validation(
            "expected_products must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
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

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
