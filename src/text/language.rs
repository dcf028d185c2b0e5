use serde::{Deserialize, Serialize};
use std::fmt;

/// Language of a book title, derived from its script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// Predominantly Arabic script
    Ar,
    /// Predominantly Latin script
    En,
    /// No letters, or no clear majority
    #[default]
    Unknown,
}

impl Lang {
    /// Returns the wire tag for this language
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::En => "en",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arabic, Arabic Supplement and Arabic Extended-A blocks
fn is_arabic(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
}

/// Detects the language of a text from its Arabic/Latin letter ratio
///
/// Only Arabic-range code points and ASCII letters are counted. The text is
/// Arabic when Arabic characters make up strictly more than 30% of the counted
/// characters, English when Latin letters outnumber Arabic ones, and unknown
/// otherwise (including empty input).
///
/// # Examples
///
/// ```
/// use elmafdein_library::text::{detect_language, Lang};
///
/// assert_eq!(detect_language("القداس الإلهي"), Lang::Ar);
/// assert_eq!(detect_language("The Divine Liturgy"), Lang::En);
/// assert_eq!(detect_language("   "), Lang::Unknown);
/// ```
pub fn detect_language(text: &str) -> Lang {
    let (arabic, latin) = text.chars().fold((0usize, 0usize), |(ar, la), c| {
        if is_arabic(c) {
            (ar + 1, la)
        } else if c.is_ascii_alphabetic() {
            (ar, la + 1)
        } else {
            (ar, la)
        }
    });

    let total = arabic + latin;
    if total == 0 {
        return Lang::Unknown;
    }

    // Integer form of arabic / total > 0.3
    if arabic * 10 > total * 3 {
        Lang::Ar
    } else if latin > arabic {
        Lang::En
    } else {
        Lang::Unknown
    }
}
