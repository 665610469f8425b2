// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval scoring: similarity ranking, weighted ranking, and recency order.
//!
//! Similarity ranking is cosine similarity plus a flat bonus for entries
//! younger than the bonus window. Weighted ranking blends similarity,
//! exponential recency decay, and the recency window's per-source
//! frequency into one linear score.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use recollect_config::model::MemoryConfig;

use crate::types::{Entry, ScoredEntry};
use crate::vectorizer::cosine_similarity;

/// Age of `entry` at `now` in seconds, never negative.
fn age_secs(entry: &Entry, now: DateTime<Utc>) -> f64 {
    let age = now - entry.timestamp;
    (age.num_milliseconds() as f64 / 1000.0).max(0.0)
}

/// Exponential decay: 1.0 at age zero, halving every `half_life_secs`.
pub fn recency_weight(age_secs: f64, half_life_secs: f64) -> f64 {
    if half_life_secs <= 0.0 {
        return 0.0;
    }
    0.5_f64.powf(age_secs.max(0.0) / half_life_secs)
}

/// Cosine similarity plus the young-entry bonus, capped at `score_cap`.
pub fn boosted_similarity(
    query: &[f64],
    entry: &Entry,
    config: &MemoryConfig,
    now: DateTime<Utc>,
) -> f64 {
    let similarity = cosine_similarity(query, &entry.vector);
    let bonus_window = Duration::hours(i64::from(config.recency_bonus_window_hours));
    let bonus = if now - entry.timestamp < bonus_window {
        config.recency_bonus
    } else {
        0.0
    };
    (similarity + bonus).min(config.score_cap)
}

/// Ranks entries by boosted similarity to `query`.
///
/// Keeps scores strictly above `similarity_threshold`, sorts descending,
/// and orders runs of near-equal scores (within `tie_window` of the run's
/// best) newest first. Returns at most `limit` results.
pub fn rank_similar(
    entries: &[Entry],
    query: &[f64],
    config: &MemoryConfig,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ScoredEntry> {
    let mut scored: Vec<ScoredEntry> = entries
        .iter()
        .filter_map(|entry| {
            let score = boosted_similarity(query, entry, config, now);
            (score > config.similarity_threshold).then(|| ScoredEntry {
                entry: entry.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    order_ties_newest_first(&mut scored, config.tie_window);
    scored.truncate(limit);
    scored
}

/// Within each run of scores no further than `window` below the run's
/// first (highest) score, reorder by timestamp descending.
///
/// Runs are formed greedily over an already descending list, which keeps
/// the comparison a total order for the sort.
fn order_ties_newest_first(scored: &mut [ScoredEntry], window: f64) {
    let mut start = 0;
    while start < scored.len() {
        let leader = scored[start].score;
        let mut end = start + 1;
        while end < scored.len() && leader - scored[end].score <= window {
            end += 1;
        }
        scored[start..end].sort_by(|a, b| b.entry.timestamp.cmp(&a.entry.timestamp));
        start = end;
    }
}

/// Weighted score of one entry.
///
/// `similarity * w_s + recency * w_r + frequency * w_f`, where frequency
/// comes from `frequencies` keyed by the entry's app tag.
pub fn weighted_score(
    query: &[f64],
    entry: &Entry,
    frequencies: &HashMap<String, f64>,
    config: &MemoryConfig,
    now: DateTime<Utc>,
) -> f64 {
    let similarity = cosine_similarity(query, &entry.vector);
    let recency = recency_weight(age_secs(entry, now), config.recency_half_life_secs);
    let frequency = frequencies.get(entry.app_tag()).copied().unwrap_or(0.0);

    similarity * config.similarity_weight
        + recency * config.recency_weight
        + frequency * config.frequency_weight
}

/// Ranks entries by weighted score.
///
/// Keeps scores strictly above `weighted_threshold`, sorts descending
/// (stable, so equal scores stay in insertion order), and truncates.
pub fn rank_weighted(
    entries: &[Entry],
    query: &[f64],
    frequencies: &HashMap<String, f64>,
    config: &MemoryConfig,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ScoredEntry> {
    let mut scored: Vec<ScoredEntry> = entries
        .iter()
        .filter_map(|entry| {
            let score = weighted_score(query, entry, frequencies, config, now);
            (score > config.weighted_threshold).then(|| ScoredEntry {
                entry: entry.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// The `limit` newest entries, newest first. Equal timestamps put the
/// later insertion first.
pub fn most_recent(entries: &[Entry], limit: usize) -> Vec<Entry> {
    let mut newest: Vec<&Entry> = entries.iter().rev().collect();
    newest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    newest.into_iter().take(limit).cloned().collect()
}
