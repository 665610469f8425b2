// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic text-to-feature-vector reduction.
//!
//! This is not a semantic embedding. Each component is a cheap surface
//! statistic scaled to stay small, so cosine similarity between two
//! vectors compares the *shape* of the texts (length, density of function
//! words, digits, punctuation, casing) rather than their meaning.

use sha2::{Digest, Sha256};

/// Number of components in every feature vector.
pub const FEATURE_DIMENSIONS: usize = 8;

/// Closed list of English function words counted by component 3.
const COMMON_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "he",
    "her", "his", "i", "if", "in", "is", "it", "its", "not", "of", "on", "or", "she", "so",
    "that", "the", "their", "there", "they", "this", "to", "was", "we", "were", "what",
    "which", "will", "with", "you",
];

/// Characters counted by component 5.
const PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '(', ')', '[', ']', '{', '}', '-', '_', '/', '\\',
    '@', '#', '$', '%', '&', '*', '+', '=', '<', '>', '|', '~', '`', '^',
];

/// Reduce `text` to its feature vector.
///
/// Pure and deterministic: identical input yields a bit-identical vector.
/// Empty or whitespace-only text is accepted and produces a near-zero
/// vector; rejecting such text is the caller's job.
///
/// Components, in order:
/// 1. character count / 1000
/// 2. whitespace-delimited word count / 100
/// 3. function words / (word count + 1)
/// 4. 1.0 if any decimal digit is present, else 0.0
/// 5. punctuation count / (character count + 1)
/// 6. line count / 10
/// 7. uppercase count / (character count + 1)
/// 8. SHA-256 of the text, first 8 bytes mod 1000, / 1000. A discriminator
///    between otherwise similar texts, carrying no meaning of its own.
pub fn vectorize(text: &str) -> Vec<f64> {
    let char_count = text.chars().count() as f64;

    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len() as f64;
    let common = words
        .iter()
        .filter(|w| is_common_word(w))
        .count() as f64;

    let has_digit = if text.chars().any(|c| c.is_ascii_digit()) {
        1.0
    } else {
        0.0
    };
    let punctuation = text.chars().filter(|c| PUNCTUATION.contains(c)).count() as f64;
    let lines = text.lines().count().max(1) as f64;
    let uppercase = text.chars().filter(|c| c.is_uppercase()).count() as f64;

    vec![
        char_count / 1000.0,
        word_count / 100.0,
        common / (word_count + 1.0),
        has_digit,
        punctuation / (char_count + 1.0),
        lines / 10.0,
        uppercase / (char_count + 1.0),
        content_hash_feature(text),
    ]
}

fn is_common_word(word: &str) -> bool {
    let normalized = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    COMMON_WORDS.contains(&normalized.as_str())
}

fn content_hash_feature(text: &str) -> f64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % 1000) as f64 / 1000.0
}

/// Cosine similarity: dot product over the product of L2 norms.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ.
/// Symmetric bit-for-bit, and exactly 1.0 for any non-zero vector against
/// itself.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum();
    let norm_b: f64 = b.iter().map(|x| x * x).sum();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0)
}
