//! DOM helpers shared by the site strategies and the secondary hop
//!
//! Everything here works on owned HTML strings and returns owned data, so no
//! parsed document is ever held across an `.await`.

use crate::text::collapse_whitespace;
use crate::url::{resolve_url, trim_link};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Download button labels, matched case-insensitively
const DOWNLOAD_LABELS: &[&str] = &["تحميل", "download", "pdf"];

/// Anchor labels that mark a "next page" link
const NEXT_LABELS: &[&str] = &["next", "التالي", "›", "»", "→", "older"];

/// Parses a CSS selector, logging and skipping invalid ones
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::debug!("Invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

/// Whitespace-collapsed text content of an element
pub fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matching any selector, tried in order
///
/// Empty matches are skipped.
pub fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| {
            document
                .select(&sel)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
}

/// Resolves a link href to an absolute URL and validates it
///
/// Surrounding quotes are stripped the same way [`crate::url::normalize_url`]
/// does. Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = trim_link(href);

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

    resolve_url(href, base_url).ok()
}

fn looks_like_pdf(link: &str) -> bool {
    let lower = link.to_lowercase();
    lower.contains(".pdf")
}

/// Finds a PDF link inside `root`
///
/// # Search Order
///
/// 1. `<a href>` whose target contains `.pdf`
/// 2. `<iframe>`/`<embed>` `src` or `<object>` `data` pointing at a PDF
///    (`.pdf` or a `/pdf` path)
/// 3. With `with_buttons`, an `<a href>` labelled تحميل / download / pdf
///
/// # Returns
///
/// The absolute URL of the first hit, if any
pub fn find_download_link(root: ElementRef, base_url: &Url, with_buttons: bool) -> Option<String> {
    let anchors: Vec<ElementRef> = selector("a[href]")
        .map(|sel| root.select(&sel).collect())
        .unwrap_or_default();

    let pdf_anchor = anchors.iter().find_map(|a| {
        let href = a.value().attr("href")?;
        if !looks_like_pdf(href) {
            return None;
        }
        resolve_link(href, base_url)
    });
    if let Some(url) = pdf_anchor {
        return Some(url.to_string());
    }

    if let Some(sel) = selector("iframe[src], embed[src], object[data]") {
        let embedded = root.select(&sel).find_map(|el| {
            let src = el.value().attr("src").or_else(|| el.value().attr("data"))?;
            let lower = src.to_lowercase();
            if !(lower.contains(".pdf") || lower.contains("/pdf")) {
                return None;
            }
            resolve_link(src, base_url)
        });
        if let Some(url) = embedded {
            return Some(url.to_string());
        }
    }

    if !with_buttons {
        return None;
    }

    anchors
        .iter()
        .find_map(|a| {
            let label = element_text(*a).to_lowercase();
            let title = a.value().attr("title").unwrap_or_default().to_lowercase();
            let is_button = DOWNLOAD_LABELS
                .iter()
                .any(|l| label.contains(l) || title.contains(l));
            if !is_button {
                return None;
            }
            resolve_link(a.value().attr("href")?, base_url)
        })
        .map(|url| url.to_string())
}

/// Anchors that sit inside a pager
const PAGER_ANCHORS: &str = ".pagination a[href], .nav-links a[href], .wp-pagenavi a[href], \
     .pager a[href], .page-numbers a[href], a.page-numbers[href], nav a[href]";

/// Checks whether a listing page links to a following page
///
/// Recognized forms: `rel="next"` on `<link>` or `<a>`, anchors whose class
/// mentions `next`, and pager anchors labelled next / التالي / › / » / →.
/// Labels are only trusted inside a pager, so a book titled "Next Steps"
/// does not count.
pub fn has_next_page(html: &str) -> bool {
    let document = Html::parse_document(html);

    if let Some(sel) = selector(r#"link[rel~="next"][href], a[rel~="next"][href]"#) {
        if document.select(&sel).next().is_some() {
            return true;
        }
    }

    if let Some(sel) = selector("a[href]") {
        let by_class = document.select(&sel).any(|a| {
            a.value()
                .attr("class")
                .is_some_and(|class| class.to_lowercase().contains("next"))
        });
        if by_class {
            return true;
        }
    }

    let Some(pager) = selector(PAGER_ANCHORS) else {
        return false;
    };

    document.select(&pager).any(|a| {
        let label = element_text(a).to_lowercase();
        label.chars().count() <= 30 && NEXT_LABELS.iter().any(|l| label.contains(l))
    })
}

/// Leading text of the page's main content area
///
/// Looks in `article`, `.entry-content`, `.post`, `.content`, `main`, then
/// `body`, and returns at most `max_chars` characters.
pub fn body_excerpt(document: &Html, max_chars: usize) -> String {
    first_text(
        document,
        &["article", ".entry-content", ".post", ".content", "main", "body"],
    )
    .map(|text| text.chars().take(max_chars).collect())
    .unwrap_or_default()
}
