//! Merging helpers applied to every search result before it leaves the crawler

use super::BookRecord;
use std::collections::HashSet;

/// Identity of a record: lowercased trimmed title plus its best link
///
/// The link is the download URL when one was found, else the details URL.
pub fn dedup_key(record: &BookRecord) -> (String, String) {
    let title = record.title.trim().to_lowercase();
    let link = record
        .download_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| record.details_url.trim())
        .to_string();
    (title, link)
}

/// Removes duplicate records, keeping the first occurrence of each identity
///
/// Order is preserved, so running this on its own output is a no-op.
pub fn dedup(records: Vec<BookRecord>) -> Vec<BookRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(dedup_key(record)))
        .collect()
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims every string field and drops records whose title ends up empty
pub fn sanitize(records: Vec<BookRecord>) -> Vec<BookRecord> {
    records
        .into_iter()
        .filter_map(|mut record| {
            record.title = record.title.trim().to_string();
            if record.title.is_empty() {
                return None;
            }
            record.details_url = record.details_url.trim().to_string();
            record.author = trim_optional(record.author.take());
            record.download_url = trim_optional(record.download_url.take());
            record.cover_image = trim_optional(record.cover_image.take());
            Some(record)
        })
        .collect()
}
