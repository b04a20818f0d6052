use url::Url;

/// Resolves a link href found on a page to an absolute HTTP(S) URL
///
/// Returns None if the link should be ignored:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: links
/// - hrefs that do not resolve to an http or https URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::resolve_link;
///
/// let base = Url::parse("https://old.reddit.com/r/pics/").unwrap();
/// assert_eq!(
///     resolve_link("/r/pics/comments/abc/", &base),
///     Some("https://old.reddit.com/r/pics/comments/abc/".to_string())
/// );
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
