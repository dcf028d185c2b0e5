//! URL handling module
//!
//! This module provides relative-link resolution, domain extraction and
//! wildcard host matching for the scraped sites.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, origin_of, site_pattern};
pub use matcher::matches_wildcard;
pub use normalize::{normalize_url, resolve_url, trim_link};

use ::url::Url;

/// Returns true if `candidate` lives on the same site as `base`
///
/// "Same site" means the candidate host matches the wildcard pattern derived
/// from the base host, so `www.christianlib.com` and `christianlib.com` are
/// treated as one site.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use elmafdein_library::url::is_same_site;
///
/// let base = Url::parse("https://www.christianlib.com/").unwrap();
/// assert!(is_same_site(&base, &Url::parse("https://christianlib.com/book/1").unwrap()));
/// assert!(!is_same_site(&base, &Url::parse("https://example.org/").unwrap()));
/// ```
pub fn is_same_site(base: &Url, candidate: &Url) -> bool {
    match (site_pattern(base), extract_domain(candidate)) {
        (Some(pattern), Some(domain)) => matches_wildcard(&pattern, &domain),
        _ => false,
    }
}
