//! Entry discovery and field extraction shared by all sites

use super::selectors::{first_text, SelectorTable};
use crate::book::{BookRecord, Source};
use crate::browser::PageSnapshot;
use crate::crawler::{element_text, find_download_link, resolve_link, selector};
use crate::text::{clean_author, clean_text, parse_number, to_ascii_digits};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Raw titles longer than this are page chrome, not book titles
pub const MAX_TITLE_CHARS: usize = 200;

/// Cleaned titles shorter than this are discarded
pub const MIN_TITLE_CHARS: usize = 3;

/// Image sources containing these are decorations, not covers
const NON_COVER_HINTS: &[&str] = &["logo", "icon", "button", "arrow"];

static PAGES_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(?:صفحات|صفحة|pages?\b|pg\b|ص\b)")
        .expect("pages pattern is valid")
});

static PAGES_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:عدد الصفحات|pages?)\s*[:：]?\s*([0-9]+)").expect("pages pattern is valid")
});

static SIZE_AFTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*(?:mb\b|ميجابايت|ميجا|ميغا|mega)")
        .expect("size pattern is valid")
});

static SIZE_BEFORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bmb|الحجم|size)\s*[:：]?\s*([0-9]+(?:\.[0-9]+)?)")
        .expect("size pattern is valid")
});

/// One book entry found on a listing page
#[derive(Debug, Clone)]
pub struct RawEntry {
    /// Outer HTML of the entry container (or anchor)
    pub html: String,

    /// The listing page the entry was found on
    pub page_url: Url,
}

impl RawEntry {
    /// Whitespace-collapsed text of the entry
    pub fn text(&self) -> String {
        let fragment = Html::parse_fragment(&self.html);
        element_text(fragment.root_element())
    }
}

/// Drops matches that contain another match, keeping the innermost entries
fn innermost(matches: Vec<ElementRef>) -> Vec<ElementRef> {
    let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();
    matches
        .into_iter()
        .filter(|el| !el.descendants().skip(1).any(|d| ids.contains(&d.id())))
        .collect()
}

/// Finds the book entries on a listing page
///
/// The selector groups are tried in order; the first group with at least one
/// non-empty element supplies every entry. When no group matches, anchors
/// whose href contains one of the site's hints become entries instead.
pub fn list_entries(html: &str, page_url: &Url, table: &SelectorTable) -> Vec<RawEntry> {
    let document = Html::parse_document(html);

    for group in table.entry_groups {
        let Some(sel) = selector(group) else {
            continue;
        };
        let matches: Vec<ElementRef> = document
            .select(&sel)
            .filter(|el| !element_text(*el).is_empty())
            .collect();
        if matches.is_empty() {
            continue;
        }

        debug!("{}: {} entries via {:?}", page_url, matches.len(), group);
        return innermost(matches)
            .into_iter()
            .map(|el| RawEntry {
                html: el.html(),
                page_url: page_url.clone(),
            })
            .collect();
    }

    anchor_entries(&document, page_url, table.anchor_hints)
}

fn anchor_entries(document: &Html, page_url: &Url, hints: &[&str]) -> Vec<RawEntry> {
    let Some(sel) = selector("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let entries: Vec<RawEntry> = document
        .select(&sel)
        .filter(|a| {
            let href = a.value().attr("href").unwrap_or_default().to_lowercase();
            hints.iter().any(|h| href.contains(h)) && !element_text(*a).is_empty()
        })
        .filter(|a| seen.insert(a.value().attr("href").unwrap_or_default().to_string()))
        .map(|a| RawEntry {
            html: a.html(),
            page_url: page_url.clone(),
        })
        .collect();

    debug!("{}: {} entries via anchor fallback", page_url, entries.len());
    entries
}

/// First decorative-free image, honouring lazy-loading attributes
fn cover_image(root: ElementRef, base_url: &Url) -> Option<String> {
    let sel = selector("img")?;
    root.select(&sel).find_map(|img| {
        let attrs = img.value();
        let src = attrs
            .attr("src")
            .filter(|s| !s.trim().is_empty() && !s.trim_start().starts_with("data:"))
            .or_else(|| attrs.attr("data-src"))
            .or_else(|| attrs.attr("data-lazy-src"))?;

        let lower = src.to_lowercase();
        if NON_COVER_HINTS.iter().any(|h| lower.contains(h)) {
            return None;
        }
        resolve_link(src, base_url).map(|u| u.to_string())
    })
}

/// Page count mentioned in free text ("320 صفحة", "Pages: 120")
pub fn pages_from_text(text: &str) -> Option<u32> {
    let text = to_ascii_digits(text);
    PAGES_AFTER
        .captures(&text)
        .or_else(|| PAGES_BEFORE.captures(&text))
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// File size in megabytes mentioned in free text ("8.5 MB", "MB 8.5")
pub fn size_from_text(text: &str) -> Option<f64> {
    let text = to_ascii_digits(text);
    SIZE_AFTER
        .captures(&text)
        .or_else(|| SIZE_BEFORE.captures(&text))
        .and_then(|caps| parse_number(&caps[1]))
        .filter(|n| *n > 0.0)
}

/// Builds a record from one listing entry
///
/// Returns `None` when the entry has no usable title: missing, longer than
/// [`MAX_TITLE_CHARS`] raw characters, or shorter than [`MIN_TITLE_CHARS`]
/// once cleaned.
pub fn extract_record(entry: &RawEntry, table: &SelectorTable, source: Source) -> Option<BookRecord> {
    let fragment = Html::parse_fragment(&entry.html);
    let root = fragment.root_element();

    let raw_title = first_text(table.title, root)?;
    if raw_title.chars().count() > MAX_TITLE_CHARS {
        debug!("Skipping entry with oversized title on {}", entry.page_url);
        return None;
    }
    let title = clean_text(&raw_title);
    if title.chars().count() < MIN_TITLE_CHARS {
        return None;
    }

    let details_url = selector("a[href]")
        .and_then(|sel| {
            root.select(&sel)
                .find_map(|a| resolve_link(a.value().attr("href")?, &entry.page_url))
        })
        .unwrap_or_else(|| entry.page_url.clone());

    let mut record = BookRecord::new(title, source, details_url.to_string());
    record.author = first_text(table.author, root).and_then(|a| clean_author(&a));
    record.cover_image = cover_image(root, &entry.page_url);
    record.download_url = find_download_link(root, &entry.page_url, false);

    let text = element_text(root);
    record.pages = pages_from_text(&text);
    record.size_mb = size_from_text(&text);

    Some(record)
}

/// Fills fields a details page can supply and the listing could not
pub fn enrich_from_details(record: &mut BookRecord, details: &PageSnapshot) {
    let document = Html::parse_document(&details.html);
    let root = document.root_element();

    if record.download_url.is_none() {
        record.download_url = find_download_link(root, &details.url, true);
    }
    if record.pages.is_none() || record.size_mb.is_none() {
        let text = element_text(root);
        record.pages = record.pages.or_else(|| pages_from_text(&text));
        record.size_mb = record.size_mb.or_else(|| size_from_text(&text));
    }
    if record.cover_image.is_none() {
        record.cover_image = cover_image(root, &details.url);
    }
}
