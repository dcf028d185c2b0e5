/// Checks if a host matches a wildcard site pattern
///
/// Two kinds of patterns are supported:
/// 1. Exact: "coptic-treasures.com" matches only that host
/// 2. Wildcard: "*.christianlib.com" matches the bare domain and any subdomain
///
/// Hosts are expected to be lowercase already (see [`super::extract_domain`]).
///
/// # Examples
///
/// ```
/// use elmafdein_library::url::matches_wildcard;
///
/// assert!(matches_wildcard("*.christianlib.com", "christianlib.com"));
/// assert!(matches_wildcard("*.christianlib.com", "www.christianlib.com"));
/// assert!(!matches_wildcard("*.christianlib.com", "christianlib.com.evil.net"));
/// assert!(matches_wildcard("coptic-treasures.com", "coptic-treasures.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => candidate == base || candidate.ends_with(&format!(".{}", base)),
        None => candidate == pattern,
    }
}
