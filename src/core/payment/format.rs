//! As-you-type formatting for the payment form fields

use regex::Regex;
use std::sync::OnceLock;

/// Longest display form of a card number: 16 digits + 3 spaces
pub const CARD_DISPLAY_MAX: usize = 19;

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s").unwrap())
}

fn non_digit() -> &'static Regex {
    static NON_DIGIT: OnceLock<Regex> = OnceLock::new();
    NON_DIGIT.get_or_init(|| Regex::new(r"[^0-9]").unwrap())
}

pub fn strip_whitespace(text: &str) -> String {
    whitespace().replace_all(text, "").into_owned()
}

pub fn digits_only(text: &str) -> String {
    non_digit().replace_all(text, "").into_owned()
}

/// Group a card number in fours: `"4242424242424242"` → `"4242 4242 4242 4242"`
pub fn format_card_number(text: &str) -> String {
    let cleaned: Vec<char> = strip_whitespace(text).chars().collect();
    let grouped = cleaned
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    grouped.chars().take(CARD_DISPLAY_MAX).collect()
}

/// Turn typed digits into `MM/YY`
pub fn format_expiry(text: &str) -> String {
    let cleaned: Vec<char> = digits_only(text).chars().collect();
    if cleaned.len() >= 2 {
        let month: String = cleaned[..2].iter().collect();
        let year: String = cleaned[2..].iter().take(2).collect();
        format!("{}/{}", month, year)
    } else {
        cleaned.into_iter().collect()
    }
}

/// Digits only, at most four
pub fn format_cvv(text: &str) -> String {
    digits_only(text).chars().take(4).collect()
}
