//! Page classification and link extraction
//!
//! This module parses a fetched page and decides:
//! - whether it is a product page (from its URL, never its DOM)
//! - which in-scope product links it points to

use crate::url::CrawlScope;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// A classified page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPage {
    /// In-scope links, absolute, de-duplicated, in document order
    pub links: Vec<Url>,

    /// Whether the page URL matches the product pattern
    pub is_product: bool,
}

/// Classifies a page and extracts the product links it contains
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` whose resolved target is in scope (same site, matches
///   the product pattern)
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Fragment-only links
/// - Anything off-site or not matching the product pattern
///
/// Relative hrefs resolve against `<base href>` when the document has one,
/// otherwise against `page_url`.
///
/// # Example
///
/// ```
/// use price_sweep::crawler::classify;
/// use price_sweep::url::CrawlScope;
/// use url::Url;
///
/// let scope = CrawlScope::new(Url::parse("http://shop.test/").unwrap(), "/shirt.php?id=*");
/// let page = Url::parse("http://shop.test/shirts.php").unwrap();
/// let html = r#"<a href="shirt.php?id=101">Red</a><a href="contact.php">Contact</a>"#;
///
/// let classified = classify(html, &page, &scope);
/// assert!(!classified.is_product);
/// assert_eq!(classified.links.len(), 1);
/// ```
pub fn classify(html: &str, page_url: &Url, scope: &CrawlScope) -> ClassifiedPage {
    let document = Html::parse_document(html);
    classify_document(&document, page_url, scope)
}

/// Same as [`classify`] for an already parsed document
pub fn classify_document(document: &Html, page_url: &Url, scope: &CrawlScope) -> ClassifiedPage {
    let base_url = document_base(document, page_url);
    let links = extract_links(document, &base_url)
        .into_iter()
        .filter(|link| scope.is_in_scope(link))
        .collect();

    ClassifiedPage {
        links,
        is_product: scope.is_product_page(page_url),
    }
}

/// Resolves the document's `<base href>` against the page URL, if present
fn document_base(document: &Html, page_url: &Url) -> Url {
    let Ok(base_selector) = Selector::parse("base[href]") else {
        return page_url.clone();
    };

    document
        .select(&base_selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone())
}

/// Extracts every followable anchor target, de-duplicated within the page
fn extract_links(document: &Html, base_url: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(mut absolute_url) = resolve_link(href, base_url) {
                absolute_url.set_fragment(None);
                if seen.insert(absolute_url.as_str().to_string()) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only hrefs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url),
        _ => None,
    }
}
