//! ChristianLib (christianlib.com)
//!
//! The book section has moved between several paths over time, so listing
//! roots are probed in order. The site has a WordPress search, which also
//! backs the secondary hop.

use super::selectors::{SelectorTable, AUTHOR_CHAIN, TITLE_CHAIN};
use super::SiteStrategy;
use crate::book::Source;
use url::Url;

const LISTING_PATHS: &[&str] = &[
    "books/",
    "library/",
    "ebooks/",
    "pdf/",
    "categories/books/",
    "",
];

const PAGE_CEILING: u32 = 20;

static SELECTORS: SelectorTable = SelectorTable {
    entry_groups: &[
        "article",
        r#"div[class*="book"], div[class*="item"], div[class*="entry"], div[class*="post"], div[class*="product"]"#,
        r#"li[class*="book"], li[class*="item"], li[class*="entry"]"#,
        r#"div[class*="card"], div[class*="box"]"#,
    ],
    anchor_hints: &["/book", "/books/", "pdf", "download", "library"],
    title: TITLE_CHAIN,
    author: AUTHOR_CHAIN,
};

pub struct ChristianLib {
    base: Url,
}

impl ChristianLib {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl SiteStrategy for ChristianLib {
    fn source(&self) -> Source {
        Source::ChristianLib
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn selectors(&self) -> &SelectorTable {
        &SELECTORS
    }

    fn listing_roots(&self) -> Vec<Url> {
        LISTING_PATHS
            .iter()
            .filter_map(|path| self.base.join(path).ok())
            .collect()
    }

    /// `/?s={query}` then `/search/{query}`
    fn search_urls(&self, query: &str) -> Vec<Url> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let mut wordpress = self.base.clone();
        wordpress.query_pairs_mut().clear().append_pair("s", query);

        let mut by_path = self.base.clone();
        let segments_ok = by_path
            .path_segments_mut()
            .map(|mut segments| {
                segments.pop_if_empty().push("search").push(query);
            })
            .is_ok();

        let mut urls = vec![wordpress];
        if segments_ok {
            urls.push(by_path);
        }
        urls
    }

    fn page_ceiling(&self) -> u32 {
        PAGE_CEILING
    }

    fn supports_secondary_hop(&self) -> bool {
        true
    }

    fn secondary_hop_hints(&self) -> &'static [&'static str] {
        &["/book/", "/?p=", ".html"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::BookRecord;
    use crate::browser::PageSnapshot;

    fn site() -> ChristianLib {
        ChristianLib::new(Url::parse("https://www.christianlib.com/").unwrap())
    }

    #[test]
    fn test_listing_roots_in_order() {
        let roots: Vec<String> = site().listing_roots().iter().map(|u| u.to_string()).collect();
        assert_eq!(
            roots,
            vec![
                "https://www.christianlib.com/books/",
                "https://www.christianlib.com/library/",
                "https://www.christianlib.com/ebooks/",
                "https://www.christianlib.com/pdf/",
                "https://www.christianlib.com/categories/books/",
                "https://www.christianlib.com/",
            ]
        );
    }

    #[test]
    fn test_search_urls_encode_query() {
        let urls = site().search_urls("القديس أنطونيوس");
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].path(), "/");
        let pairs: Vec<(String, String)> = urls[0]
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![("s".to_string(), "القديس أنطونيوس".to_string())]);
        assert!(urls[1].path().starts_with("/search/"));
        assert!(!urls[1].path().contains(' '));
    }

    #[test]
    fn test_search_urls_blank_query() {
        assert!(site().search_urls("   ").is_empty());
    }

    #[test]
    fn test_product_grid() {
        let page = PageSnapshot {
            url: Url::parse("https://www.christianlib.com/books/").unwrap(),
            html: r#"
                <div class="product-grid">
                    <div class="product">
                        <h2 class="woocommerce-loop-product__title">
                            <a href="/book/desert-fathers/">Sayings of the Desert Fathers</a>
                        </h2>
                        <span class="book-author">Benedicta Ward</span>
                        <span>Size: 4.2 MB - 310 pages</span>
                    </div>
                </div>
            "#
            .to_string(),
        };
        let site = site();
        let records: Vec<BookRecord> = site
            .list_page(&page)
            .iter()
            .filter_map(|e| site.extract_entry(e))
            .collect();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.title, "Sayings of the Desert Fathers");
        assert_eq!(record.author.as_deref(), Some("Benedicta Ward"));
        assert_eq!(record.size_mb, Some(4.2));
        assert_eq!(record.pages, Some(310));
        assert_eq!(record.source, Source::ChristianLib);
        assert_eq!(record.lang, crate::text::Lang::En);
    }
}
