use crate::UrlError;
use url::Url;

/// Characters scraped hrefs are commonly wrapped in
const QUOTE_CHARS: &[char] = &['"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// Returns true if the string already carries an http(s) scheme
fn is_absolute_http(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Strips surrounding whitespace and quote characters from a scraped link
pub fn trim_link(url: &str) -> &str {
    url.trim().trim_matches(QUOTE_CHARS).trim()
}

/// Normalizes a scraped link against the page it was found on
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace and quote characters
/// 2. Return the link unchanged if it is already absolute (`http`/`https`)
/// 3. Otherwise resolve it against `base` with standard relative-URL rules
///
/// If `base` itself cannot be parsed, the trimmed link is returned as-is.
///
/// # Arguments
///
/// * `url` - The raw href/src value
/// * `base` - The URL of the page the link was found on
///
/// # Examples
///
/// ```
/// use elmafdein_library::url::normalize_url;
///
/// let base = "https://coptic-treasures.com/sections/books/";
/// assert_eq!(normalize_url(" '/book/12' ", base), "https://coptic-treasures.com/book/12");
/// assert_eq!(normalize_url("page/2/", base), "https://coptic-treasures.com/sections/books/page/2/");
/// assert_eq!(normalize_url("https://cdn.example.com/a.pdf", base), "https://cdn.example.com/a.pdf");
/// ```
pub fn normalize_url(url: &str, base: &str) -> String {
    let trimmed = trim_link(url);

    if is_absolute_http(trimmed) {
        return trimmed.to_string();
    }

    match Url::parse(base).and_then(|b| b.join(trimmed)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Resolves a link to an absolute http(s) URL
///
/// Like [`normalize_url`], but returns a parsed [`Url`] and rejects anything
/// that does not end up as an HTTP(S) URL with a host.
///
/// # Returns
///
/// * `Ok(Url)` - Absolute HTTP(S) URL
/// * `Err(UrlError)` - Malformed link, foreign scheme, or missing host
pub fn resolve_url(url: &str, base: &Url) -> Result<Url, UrlError> {
    let normalized = normalize_url(url, base.as_str());
    let parsed = Url::parse(&normalized).map_err(|e| UrlError::Parse(e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(parsed)
}
