//! Text normalization utilities
//!
//! Book listings on the target sites mix Arabic and Latin script, Arabic-Indic
//! and ASCII digits, and a fair amount of decoration ("تحميل كتاب", "- PDF").
//! This module turns those raw fragments into clean values:
//! - Number parsing with Arabic-Indic digit support
//! - Language detection by script ratio
//! - Boilerplate-stripping text cleanup
//! - Publication year extraction

mod clean;
mod language;
mod number;

pub use clean::{clean_author, clean_text, collapse_whitespace};
pub use language::{detect_language, Lang};
pub use number::{extract_year, parse_number, to_ascii_digits};
