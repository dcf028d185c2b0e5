//! Typed selector chains
//!
//! Each extracted field has an ordered list of [`Matcher`]s. They are tried in
//! sequence against an entry and the first one producing non-empty text wins,
//! which keeps extraction working when a site's markup drifts.

use crate::crawler::{element_text, selector};
use scraper::ElementRef;

/// One way of locating an element inside an entry
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// A plain CSS selector
    Css(&'static str),

    /// Elements matching `tags` whose `class` attribute contains any needle
    ClassContains {
        tags: &'static str,
        needles: &'static [&'static str],
    },

    /// Elements matching `tags` whose own text nodes contain any needle
    /// (case-insensitive)
    TextContains {
        tags: &'static str,
        needles: &'static [&'static str],
    },
}

impl Matcher {
    /// All elements under `root` this matcher selects, in document order
    pub fn find<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let css = match self {
            Matcher::Css(css) => css,
            Matcher::ClassContains { tags, .. } | Matcher::TextContains { tags, .. } => tags,
        };
        let Some(sel) = selector(css) else {
            return Vec::new();
        };

        root.select(&sel)
            .filter(|el| match self {
                Matcher::Css(_) => true,
                Matcher::ClassContains { needles, .. } => {
                    let class = el.value().attr("class").unwrap_or_default().to_lowercase();
                    needles.iter().any(|n| class.contains(n))
                }
                Matcher::TextContains { needles, .. } => {
                    let own: String = el
                        .children()
                        .filter_map(|node| node.value().as_text())
                        .map(|t| t.to_lowercase())
                        .collect();
                    needles.iter().any(|n| own.contains(n))
                }
            })
            .collect()
    }
}

/// Text of the first element, across the chain, with non-empty text
pub fn first_text(chain: &[Matcher], root: ElementRef) -> Option<String> {
    chain.iter().find_map(|matcher| {
        matcher
            .find(root)
            .into_iter()
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

/// Title: headings first, then links, then title-ish classes, then bold text
pub const TITLE_CHAIN: &[Matcher] = &[
    Matcher::Css("h1"),
    Matcher::Css("h2"),
    Matcher::Css("h3"),
    Matcher::Css("h4"),
    Matcher::Css("h5"),
    Matcher::Css("h6"),
    Matcher::Css("a"),
    Matcher::ClassContains {
        tags: "*",
        needles: &["title", "name", "heading"],
    },
    Matcher::Css("strong, b"),
];

/// Author: author-ish classes, then "by"-style bylines
pub const AUTHOR_CHAIN: &[Matcher] = &[
    Matcher::ClassContains {
        tags: "*",
        needles: &["author", "writer", "مؤلف", "كاتب"],
    },
    Matcher::TextContains {
        tags: "span, p, small, div, li, em",
        needles: &["by ", "بقلم", "تأليف", "للكاتب"],
    },
];

/// Where a site's book entries live and how fields are read from them
#[derive(Debug, Clone, Copy)]
pub struct SelectorTable {
    /// Entry container selector groups, most specific first; the first group
    /// matching any non-empty element is used for the whole page
    pub entry_groups: &'static [&'static str],

    /// Substrings of hrefs that mark book links when no group matches
    pub anchor_hints: &'static [&'static str],

    pub title: &'static [Matcher],
    pub author: &'static [Matcher],
}
