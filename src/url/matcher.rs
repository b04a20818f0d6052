/// Checks if a domain matches a politeness pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact: "old.reddit.com" matches only "old.reddit.com"
/// 2. Wildcard: "*.reddit.com" matches "reddit.com" and any subdomain of it
///
/// # Examples
///
/// ```
/// use listing_harvester::url::matches_wildcard;
///
/// assert!(matches_wildcard("old.reddit.com", "old.reddit.com"));
/// assert!(matches_wildcard("*.reddit.com", "reddit.com"));
/// assert!(matches_wildcard("*.reddit.com", "old.reddit.com"));
/// assert!(!matches_wildcard("*.reddit.com", "notreddit.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}
