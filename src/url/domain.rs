use url::Url;

/// Extracts the domain from a URL
///
/// Returns the lowercase host, or None if the URL has no host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use price_sweep::url::extract_domain;
///
/// let url = Url::parse("http://SHIRTS4MIKE.com/shirts.php").unwrap();
/// assert_eq!(extract_domain(&url), Some("shirts4mike.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Host used for same-site comparison: lowercase, without a leading `www.`
fn site_host(url: &Url) -> Option<String> {
    extract_domain(url).map(|host| match host.strip_prefix("www.") {
        Some(bare) if !bare.is_empty() => bare.to_string(),
        _ => host,
    })
}

/// Returns true if both URLs point at the same site
///
/// The scheme is ignored and `www.host` equals `host`, so a catalog that
/// redirects to https or to its `www.` name stays in scope. An explicit
/// non-default port still distinguishes sites.
pub fn is_same_site(url: &Url, base: &Url) -> bool {
    match (site_host(url), site_host(base)) {
        (Some(a), Some(b)) => a == b && url.port() == base.port(),
        _ => false,
    }
}
