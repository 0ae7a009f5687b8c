//! URL handling module for Price-Sweep
//!
//! This module provides URL normalization, domain extraction, wildcard
//! matching and the crawl scope that decides which links are followed and
//! which pages are product pages.

mod domain;
mod matcher;
mod normalize;

use crate::config::SiteConfig;
use crate::{ConfigError, ConfigResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, is_same_site};
pub use matcher::matches_wildcard;
pub use normalize::{normalize_parsed, normalize_url};

/// The part of a site the crawler cares about
///
/// A URL is in scope when it lives on the same site as the base URL and its
/// path-and-query matches the product pattern. Listing pages are never in
/// scope themselves; they are only reached as the seed.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    base: Url,
    product_pattern: String,
}

impl CrawlScope {
    pub fn new(base: Url, product_pattern: impl Into<String>) -> Self {
        Self {
            base,
            product_pattern: product_pattern.into(),
        }
    }

    /// Builds the scope from the site configuration
    pub fn from_config(site: &SiteConfig) -> ConfigResult<Self> {
        let base = Url::parse(&site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", site.base_url, e)))?;
        Ok(Self::new(base, site.product_pattern.clone()))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Returns true if the URL's path and query match the product pattern
    ///
    /// # Examples
    ///
    /// ```
    /// use price_sweep::url::CrawlScope;
    /// use url::Url;
    ///
    /// let scope = CrawlScope::new(Url::parse("http://shop.test/").unwrap(), "/shirt.php?id=*");
    /// assert!(scope.is_product_page(&Url::parse("http://shop.test/shirt.php?id=7").unwrap()));
    /// assert!(!scope.is_product_page(&Url::parse("http://shop.test/shirts.php").unwrap()));
    /// ```
    pub fn is_product_page(&self, url: &Url) -> bool {
        matches_wildcard(&self.product_pattern, &path_and_query(url))
    }

    /// Returns true if the link should be followed
    pub fn is_in_scope(&self, url: &Url) -> bool {
        is_same_site(url, &self.base) && self.is_product_page(url)
    }
}

/// Path plus `?query` when present, the string product patterns match against
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
