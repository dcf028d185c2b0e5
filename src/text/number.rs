use regex::Regex;
use std::sync::LazyLock;

/// First decimal number in an ASCII-digit string
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("number pattern is valid"));

/// Four-digit years from the 19th to the 21st century
static YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])((?:18|19|20)[0-9]{2})(?:[^0-9]|$)").expect("year pattern is valid")
});

/// Maps Arabic-Indic and Extended Arabic-Indic digits to ASCII
///
/// The Arabic decimal separator (U+066B) becomes `.` and the Arabic thousands
/// separator (U+066C) is dropped. All other characters pass through unchanged.
///
/// # Examples
///
/// ```
/// use elmafdein_library::text::to_ascii_digits;
///
/// assert_eq!(to_ascii_digits("٣٢٠ صفحة"), "320 صفحة");
/// assert_eq!(to_ascii_digits("٥٫٢"), "5.2");
/// ```
pub fn to_ascii_digits(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
            '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
            '\u{066B}' => Some('.'),
            '\u{066C}' => None,
            other => Some(other),
        })
        .collect()
}

/// Parses the first decimal number out of free text
///
/// Arabic-Indic digits are mapped to ASCII first, then everything that is not
/// part of a `digits[.digits]` run is ignored.
///
/// # Arguments
///
/// * `text` - Free text such as "٥.٢ ميجا" or "Size: 12.5 MB"
///
/// # Returns
///
/// * `Some(f64)` - The first number found
/// * `None` - If the text contains no digits
///
/// # Examples
///
/// ```
/// use elmafdein_library::text::parse_number;
///
/// assert_eq!(parse_number("٥.٢ ميجا"), Some(5.2));
/// assert_eq!(parse_number("MB 8.5"), Some(8.5));
/// assert_eq!(parse_number("no digits"), None);
/// ```
pub fn parse_number(text: &str) -> Option<f64> {
    let ascii = to_ascii_digits(text);
    NUMBER_PATTERN
        .find(&ascii)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Extracts the first plausible publication year (1800-2099) from text
pub fn extract_year(text: &str) -> Option<u16> {
    let ascii = to_ascii_digits(text);
    YEAR_PATTERN
        .captures(&ascii)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
}
