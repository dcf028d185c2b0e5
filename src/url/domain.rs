use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use elmafdein_library::url::extract_domain;
///
/// let url = Url::parse("https://WWW.ChristianLib.com/books/").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.christianlib.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the `scheme://host[:port]` origin of a URL, used to key robots.txt
pub fn origin_of(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Builds the wildcard host pattern covering a site and its subdomains
///
/// A leading `www.` is dropped so that the bare domain matches too.
pub fn site_pattern(url: &Url) -> Option<String> {
    let domain = extract_domain(url)?;
    let bare = domain.strip_prefix("www.").unwrap_or(&domain);
    Some(format!("*.{}", bare))
}
