//! Coptic Treasures (coptic-treasures.com)
//!
//! A single paginated book section at `/sections/books/` and no usable search
//! endpoint; queries filter the first listing page.

use super::extract::{enrich_from_details, extract_record, RawEntry};
use super::selectors::{SelectorTable, AUTHOR_CHAIN, TITLE_CHAIN};
use super::SiteStrategy;
use crate::book::{BookRecord, Source};
use crate::browser::PageSnapshot;
use crate::crawler::body_excerpt;
use crate::text::extract_year;
use scraper::Html;
use url::Url;

const LISTING_PATH: &str = "sections/books/";
const PAGE_CEILING: u32 = 50;

static SELECTORS: SelectorTable = SelectorTable {
    entry_groups: &[
        "article",
        "div.book, div.card, div.entry, div.post, div.grid-item",
        r#"div[class*="book"], div[class*="entry"], div[class*="card"]"#,
        r#"li[class*="book"], li[class*="entry"]"#,
    ],
    anchor_hints: &["/book", "/books/"],
    title: TITLE_CHAIN,
    author: AUTHOR_CHAIN,
};

pub struct CopticTreasures {
    base: Url,
}

impl CopticTreasures {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl SiteStrategy for CopticTreasures {
    fn source(&self) -> Source {
        Source::Coptic
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn selectors(&self) -> &SelectorTable {
        &SELECTORS
    }

    fn listing_roots(&self) -> Vec<Url> {
        self.base.join(LISTING_PATH).into_iter().collect()
    }

    fn page_ceiling(&self) -> u32 {
        PAGE_CEILING
    }

    fn extract_entry(&self, entry: &RawEntry) -> Option<BookRecord> {
        let mut record = extract_record(entry, &SELECTORS, Source::Coptic)?;
        record.year = extract_year(&entry.text());
        Some(record)
    }

    fn enrich(&self, record: &mut BookRecord, details: &PageSnapshot) {
        enrich_from_details(record, details);
        if record.year.is_none() {
            let document = Html::parse_document(&details.html);
            record.year = extract_year(&body_excerpt(&document, 4000));
        }
    }
}
