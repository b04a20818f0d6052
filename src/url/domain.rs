use url::Url;

/// Extracts the lowercase host of a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::extract_domain;
///
/// let url = Url::parse("https://OLD.reddit.com/r/pics/").unwrap();
/// assert_eq!(extract_domain(&url), Some("old.reddit.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Parses `url` and extracts its lowercase host
///
/// Returns `None` for unparsable URLs and URLs without a host.
pub fn domain_of(url: &str) -> Option<String> {
    Url::parse(url).ok().as_ref().and_then(extract_domain)
}
