//! Text features for profile/requirement matching.
//!
//! Provides pure functions and small value types used by extraction and scoring:
//! - Text normalization
//! - Tokenization into whole words
//! - Pre-tokenized phrases with word-boundary-safe matching

use std::collections::HashSet;
use std::ops::Range;

/// Normalize text for matching.
///
/// Lowercases, then replaces every character outside `[a-z0-9]` and
/// whitespace with a single space. Whitespace runs are left as they are.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Count whitespace-delimited words in raw, unnormalized text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// A normalized text together with the byte spans of its tokens.
#[derive(Debug, Clone, Default)]
pub struct NormalizedText {
    text: String,
    spans: Vec<Range<usize>>,
    /// Tokens joined by single spaces
    joined: String,
}

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let text = normalize_text(raw);
        let spans = token_spans(&text);
        let joined = spans
            .iter()
            .map(|span| &text[span.clone()])
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            spans,
            joined,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Tokens in order of appearance.
    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(|span| &self.text[span.clone()])
    }

    /// Distinct tokens.
    pub fn word_set(&self) -> HashSet<&str> {
        self.tokens().collect()
    }

    /// Whole-token match: the phrase's tokens must appear consecutively.
    ///
    /// "ai" does not match inside "air", and "power bi" matches
    /// "power, bi" since punctuation normalizes to whitespace.
    pub fn contains_phrase(&self, phrase: &Phrase) -> bool {
        let width = phrase.tokens.len();
        if width == 0 || width > self.spans.len() {
            return false;
        }

        self.spans.windows(width).any(|window| {
            window
                .iter()
                .zip(&phrase.tokens)
                .all(|(span, token)| &self.text[span.clone()] == token.as_str())
        })
    }

    /// Substring match against the tokens joined by single spaces.
    ///
    /// "incidents" hits "incident", and "root cause" matches across a
    /// line break or a comma between the two words.
    pub fn contains_substring(&self, phrase: &Phrase) -> bool {
        !phrase.text.is_empty() && self.joined.contains(phrase.text.as_str())
    }
}

/// A phrase normalized and split into tokens once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    text: String,
    tokens: Vec<String>,
}

impl Phrase {
    /// Returns `None` when nothing survives normalization.
    pub fn new(raw: &str) -> Option<Self> {
        let normalized = normalize_text(raw);
        let tokens: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return None;
        }

        Some(Self {
            text: tokens.join(" "),
            tokens,
        })
    }

    /// Normalized form, tokens joined by single spaces.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

fn token_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push(s..i);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push(s..text.len());
    }

    spans
}
