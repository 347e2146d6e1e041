//! Tokenisation and word-frequency counting.
//!
//! ## Counting rules
//!
//! * The raw **word count** is the number of non-empty whitespace-separated
//!   tokens (any Unicode whitespace) in the trimmed text.
//! * Each token is **normalised** into a frequency key: lower-cased, then
//!   every character that is neither a word character (letters, digits,
//!   underscore) nor an apostrophe is removed, then trimmed.
//! * A token whose key is empty (pure punctuation such as `—` or `...`)
//!   still counts toward the word count but never enters the frequency table.
//!
//! The frequency table remembers the order in which words were first seen.
//! The report formatter relies on this for its tie-break among equal counts.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w']").unwrap());

/// Occurrence count per normalised word, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFrequency {
    counts: IndexMap<String, usize>,
}

impl WordFrequency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `word`, inserting it with a count of zero first if absent.
    pub fn record(&mut self, word: String) {
        *self.counts.entry(word).or_insert(0) += 1;
    }

    /// Number of distinct words.
    pub fn unique_count(&self) -> usize {
        self.counts.len()
    }

    /// Sum of all counts.
    pub fn total_occurrences(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn get(&self, word: &str) -> Option<usize> {
        self.counts.get(word).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Entries sorted by descending count; equal counts keep first-seen order.
    pub fn sorted_by_count(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        // `sort_by` is stable, so ties stay in insertion order.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

/// Word statistics for one piece of recognised text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextStats {
    /// Non-empty whitespace-separated tokens, before normalisation.
    pub word_count: usize,
    pub frequency: WordFrequency,
}

impl TextStats {
    pub fn unique_words(&self) -> usize {
        self.frequency.unique_count()
    }
}

/// Normalise a single token into its frequency key.
///
/// Returns an empty string for tokens made only of punctuation or apostrophes
/// that reduce to nothing.
pub fn normalize_word(token: &str) -> String {
    let lower = token.to_lowercase();
    let stripped = RE_NON_WORD.replace_all(&lower, "");
    let trimmed = stripped.trim();
    if trimmed.chars().all(|c| c == '\'') {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Split `text` into tokens and count normalised word frequencies.
pub fn analyze_text(text: &str) -> TextStats {
    let mut stats = TextStats::default();
    for token in text.trim().split_whitespace() {
        stats.word_count += 1;
        let key = normalize_word(token);
        if !key.is_empty() {
            stats.frequency.record(key);
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_case_folding_and_punctuation() {
        let stats = analyze_text("The cat sat. The CAT sat!");
        assert_eq!(stats.word_count, 6);
        assert_eq!(stats.frequency.get("the"), Some(2));
        assert_eq!(stats.frequency.get("cat"), Some(2));
        assert_eq!(stats.frequency.get("sat"), Some(2));
        assert_eq!(stats.unique_words(), 3);
    }

    #[test]
    fn empty_text() {
        let stats = analyze_text("");
        assert_eq!(stats.word_count, 0);
        assert!(stats.frequency.is_empty());

        let stats = analyze_text("  \n\t ");
        assert_eq!(stats.word_count, 0);
        assert!(stats.frequency.is_empty());
    }

    #[test]
    fn punctuation_only_tokens_count_but_are_not_tabulated() {
        let stats = analyze_text("hello -- world ... ''");
        assert_eq!(stats.word_count, 5);
        assert_eq!(stats.frequency.unique_count(), 2);
        assert_eq!(stats.frequency.total_occurrences(), 2);
    }

    #[test]
    fn internal_apostrophes_survive() {
        assert_eq!(normalize_word("Don't"), "don't");
        assert_eq!(normalize_word("\"O'Brien,\""), "o'brien");
        assert_eq!(normalize_word("'''"), "");
    }

    #[test]
    fn underscore_and_digits_are_word_characters() {
        assert_eq!(normalize_word("snake_case!"), "snake_case");
        assert_eq!(normalize_word("(2024)"), "2024");
    }

    #[test]
    fn unicode_letters_are_kept() {
        assert_eq!(normalize_word("Café,"), "café");
        assert_eq!(normalize_word("ÜBER"), "über");
    }

    #[test]
    fn any_unicode_whitespace_splits() {
        let stats = analyze_text("one\u{00A0}two\u{2003}three\nfour");
        assert_eq!(stats.word_count, 4);
    }

    #[test]
    fn normalisation_is_idempotent() {
        for token in ["Hello!", "it's", "A_B-C", "Café", "--", "''x''", "MiXeD123"] {
            let once = normalize_word(token);
            assert_eq!(normalize_word(&once), once, "token {token:?}");
        }
    }

    #[test]
    fn frequency_sum_counts_tokens_with_nonempty_keys() {
        for text in ["a b c", "! ? .", "x x, x. --", "", "The cat sat. The CAT sat!", "'' it's"] {
            let stats = analyze_text(text);
            let keyed = text
                .split_whitespace()
                .filter(|t| !normalize_word(t).is_empty())
                .count();
            assert_eq!(stats.frequency.total_occurrences(), keyed, "text {text:?}");
            assert!(stats.frequency.total_occurrences() <= stats.word_count);
            assert_eq!(stats.word_count, text.split_whitespace().count());
        }
    }

    #[test]
    fn sort_is_count_descending_and_stable() {
        let stats = analyze_text("b a c a d c e");
        let sorted = stats.frequency.sorted_by_count();
        assert_eq!(
            sorted,
            vec![("a", 2), ("c", 2), ("b", 1), ("d", 1), ("e", 1)]
        );
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let stats = analyze_text("zebra apple mango apple");
        let order: Vec<&str> = stats.frequency.iter().map(|(w, _)| w).collect();
        assert_eq!(order, vec!["zebra", "apple", "mango"]);
    }
}
