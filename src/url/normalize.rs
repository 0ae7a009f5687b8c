use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a URL into the form used as the frontier's de-duplication key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only http:// and https://
/// 3. Require a host (the parser already lowercases it)
/// 4. Remove fragment (everything after #)
/// 5. Remove empty query string (trailing ?)
///
/// Query parameter order and path trailing slashes are kept: catalog sites
/// commonly route on them.
///
/// # Examples
///
/// ```
/// use price_sweep::url::normalize_url;
///
/// let url = normalize_url("http://SHOP.Example.com/shirt.php?id=101#top").unwrap();
/// assert_eq!(url.as_str(), "http://shop.example.com/shirt.php?id=101");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Same as [`normalize_url`] for an already parsed URL
pub fn normalize_parsed(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
