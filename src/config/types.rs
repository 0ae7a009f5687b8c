use serde::Deserialize;

/// Base URL of the reference catalog site
pub const DEFAULT_BASE_URL: &str = "http://shirts4mike.com/";

/// Catalog entry point, relative to the base URL
pub const DEFAULT_SEED_PATH: &str = "shirts.php";

/// Path-and-query pattern identifying product pages
pub const DEFAULT_PRODUCT_PATTERN: &str = "/shirt.php?id=*";

/// Hidden form field carrying the item name
pub const ITEM_NAME_SELECTOR: &str = "input[name=\"item_name\"]";
pub const ITEM_NAME_ATTRIBUTE: &str = "value";

/// Element holding the displayed price
pub const PRICE_SELECTOR: &str = ".price";

/// Product picture
pub const IMAGE_SELECTOR: &str = ".shirt-picture span img";
pub const IMAGE_ATTRIBUTE: &str = "src";

/// Main configuration structure for Price-Sweep
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL of the site; only links on the same host are followed
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Seed path joined onto the base URL
    #[serde(rename = "seed-path")]
    pub seed_path: String,

    /// Pattern matched against a URL's path and query (`*` is a wildcard)
    #[serde(rename = "product-pattern")]
    pub product_pattern: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            seed_path: DEFAULT_SEED_PATH.to_string(),
            product_pattern: DEFAULT_PRODUCT_PATTERN.to_string(),
        }
    }
}

/// One DOM location: a CSS selector and, optionally, the attribute to read.
/// Without an attribute the element's text content is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSelector {
    pub css: String,
    #[serde(default)]
    pub attribute: Option<String>,
}

impl FieldSelector {
    pub fn text(css: &str) -> Self {
        Self {
            css: css.to_string(),
            attribute: None,
        }
    }

    pub fn attr(css: &str, attribute: &str) -> Self {
        Self {
            css: css.to_string(),
            attribute: Some(attribute.to_string()),
        }
    }
}

/// Selectors for the product page fields
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "item-name")]
    pub item_name: FieldSelector,
    pub price: FieldSelector,
    pub image: FieldSelector,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            item_name: FieldSelector::attr(ITEM_NAME_SELECTOR, ITEM_NAME_ATTRIBUTE),
            price: FieldSelector::text(PRICE_SELECTOR),
            image: FieldSelector::attr(IMAGE_SELECTOR, IMAGE_ATTRIBUTE),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Extra attempts after a failed fetch
    pub retries: u32,

    /// Maximum number of concurrent page fetches
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: u32,

    /// Stop once this many products were collected
    #[serde(rename = "expected-products")]
    pub expected_products: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            retries: 0,
            max_concurrent_fetches: 4,
            expected_products: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives the dated CSV files
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "data".to_string(),
        }
    }
}
