//! Text normalization and tokenization.

/// Canonical comparison form of a string.
///
/// Lowercases, drops every character that is not an ASCII lowercase letter,
/// an ASCII digit, or whitespace, then trims both ends.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Whitespace-delimited tokens of `text`. Empty input has no tokens.
pub fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Number of whitespace-delimited tokens in `text`.
pub fn word_count(text: &str) -> usize {
    tokens(text).count()
}
