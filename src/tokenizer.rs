//! Word tokenization shared by training and classification.
//!
//! A token is a maximal run of word characters (Unicode letters, digits and
//! underscore), lowercased. Everything else, punctuation included, only
//! separates tokens.

use regex::Regex;
use std::sync::OnceLock;

static WORD: OnceLock<Regex> = OnceLock::new();

fn word_pattern() -> &'static Regex {
    WORD.get_or_init(|| Regex::new(r"\w+").expect("word pattern is a valid regex"))
}

/// Split `text` into lowercase word tokens.
///
/// Order and duplicates are preserved; empty input yields no tokens.
///
/// # Example
/// ```rust
/// assert_eq!(tokenize("Let's MEET"), vec!["let", "s", "meet"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    word_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_punctuation() {
        assert_eq!(
            tokenize("let's meet for a meeting"),
            vec!["let", "s", "meet", "for", "a", "meeting"]
        );
    }

    #[test]
    fn test_lowercases_and_keeps_duplicates() {
        assert_eq!(tokenize("FREE free Free!!!"), vec!["free", "free", "free"]);
    }

    #[test]
    fn test_keeps_digits_and_underscore() {
        assert_eq!(tokenize("win $1000 now_now"), vec!["win", "1000", "now_now"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ,.;!? ").is_empty());
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(tokenize("优惠 Café"), vec!["优惠", "café"]);
    }

    #[test]
    fn test_tokens_are_nonempty_lowercase_word_chars() {
        let text = "Subject: RE: [URGENT] Claim your PRIZE_2024 -- reply@example.com (100% free)";
        let tokens = tokenize(text);
        assert!(!tokens.is_empty());
        for token in tokens {
            assert!(!token.is_empty());
            assert!(token
                .chars()
                .all(|c| c == '_' || c.is_ascii_digit() || c.is_ascii_lowercase()));
        }
    }
}
