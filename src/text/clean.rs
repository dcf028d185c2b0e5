use regex::Regex;
use std::sync::LazyLock;

/// Leading decoration: "Book:", "كتاب", "Download -", "بواسطة" ...
static BOILERPLATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:تحميل|كتاب|بواسطة|مؤلف|download|book|by|author|pdf)(?:\s*[:\-–|]\s*|\s+)",
    )
    .expect("prefix pattern is valid")
});

/// Trailing decoration: "- PDF", "| تحميل", "(pdf)" ...
static BOILERPLATE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\s*[\-–|:]\s*(?:تحميل|كتاب|download|book|pdf)|\s*[\(\[]\s*pdf\s*[\)\]]|\s+pdf)$",
    )
    .expect("suffix pattern is valid")
});

/// Author attribution words that precede the actual name
static AUTHOR_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:author\s*:|written\s+by(?:\s+|$)|by(?:\s+|$)|بقلم|تأليف|للكاتب|المؤلف\s*:?|الكاتب\s*:?)\s*")
        .expect("author marker pattern is valid")
});

/// Collapses every whitespace run to a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans a scraped title fragment
///
/// Collapses whitespace, trims, and repeatedly strips boilerplate prefixes and
/// suffixes in Arabic and English ("book", "by", "download", "PDF")
/// case-insensitively until the text is stable.
///
/// # Examples
///
/// ```
/// use elmafdein_library::text::clean_text;
///
/// assert_eq!(clean_text("  Download:  The   Ladder of Divine Ascent - PDF "), "The Ladder of Divine Ascent");
/// assert_eq!(clean_text("تحميل كتاب القداس الإلهي"), "القداس الإلهي");
/// ```
pub fn clean_text(text: &str) -> String {
    let mut current = collapse_whitespace(text);

    loop {
        let stripped = BOILERPLATE_PREFIX.replace(&current, "");
        let stripped = BOILERPLATE_SUFFIX.replace(&stripped, "");
        let stripped = stripped.trim().to_string();

        if stripped == current {
            return current;
        }
        current = stripped;
    }
}

/// Cleans a scraped author fragment
///
/// Strips attribution markers ("by", "بقلم", "تأليف", "Author:") and collapses
/// whitespace. Returns `None` when nothing meaningful is left.
pub fn clean_author(text: &str) -> Option<String> {
    let collapsed = collapse_whitespace(text);
    let stripped = AUTHOR_MARKER.replace(&collapsed, "");
    let cleaned = stripped.trim().trim_matches(|c: char| c == ':' || c == '-').trim();

    if cleaned.chars().count() < 2 {
        None
    } else {
        Some(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_clean_english_prefix_and_suffix() {
        assert_eq!(clean_text("Book: On the Incarnation - Download"), "On the Incarnation");
        assert_eq!(clean_text("On the Incarnation (PDF)"), "On the Incarnation");
        assert_eq!(clean_text("On the Incarnation pdf"), "On the Incarnation");
    }

    #[test]
    fn test_clean_arabic_prefix() {
        assert_eq!(clean_text("كتاب: بستان الرهبان"), "بستان الرهبان");
        assert_eq!(clean_text("تحميل كتاب بستان الرهبان - PDF"), "بستان الرهبان");
    }

    #[test]
    fn test_clean_keeps_words_that_only_start_with_markers() {
        assert_eq!(clean_text("Booker Lectures"), "Booker Lectures");
        assert_eq!(clean_text("Bylaws of the Church"), "Bylaws of the Church");
    }

    #[test]
    fn test_clean_keeps_inner_words() {
        assert_eq!(clean_text("The Book of Psalms"), "The Book of Psalms");
    }

    #[test]
    fn test_clean_is_stable() {
        let once = clean_text("Download - Book: Homilies - pdf");
        assert_eq!(once, "Homilies");
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn test_clean_author_markers() {
        assert_eq!(clean_author("by Fr. Tadros Malaty"), Some("Fr. Tadros Malaty".to_string()));
        assert_eq!(clean_author("بقلم  القمص تادرس يعقوب"), Some("القمص تادرس يعقوب".to_string()));
        assert_eq!(clean_author("Author: St. Athanasius"), Some("St. Athanasius".to_string()));
    }

    #[test]
    fn test_clean_author_keeps_names_starting_with_by() {
        assert_eq!(clean_author("Byron Hart"), Some("Byron Hart".to_string()));
    }

    #[test]
    fn test_clean_author_empty() {
        assert_eq!(clean_author("by"), None);
        assert_eq!(clean_author("   "), None);
    }
}
