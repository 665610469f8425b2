// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recency window: a bounded buffer of recently inserted vectors.
//!
//! Only used to derive the frequency signal of weighted ranking. It is
//! rebuilt from scratch on every process start and never written to disk.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

use crate::types::RecentVector;

/// Age- and count-bounded window of recent vectors, oldest at the front.
#[derive(Debug, Clone)]
pub struct RecencyWindow {
    items: VecDeque<RecentVector>,
    max_count: usize,
    max_age: Duration,
}

impl RecencyWindow {
    /// Creates an empty window.
    pub fn new(max_count: usize, max_age_secs: u64) -> Self {
        Self {
            items: VecDeque::new(),
            max_count,
            max_age: Duration::seconds(
                i64::try_from(max_age_secs)
                    .unwrap_or(i64::MAX)
                    .min(i64::MAX / 1000),
            ),
        }
    }

    /// Records a new vector, then prunes.
    pub fn insert(&mut self, item: RecentVector, now: DateTime<Utc>) {
        self.items.push_back(item);
        self.prune(now);
    }

    /// Drops items older than the age bound, then trims oldest-first down
    /// to the count bound.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let max_age = self.max_age;
        self.items.retain(|item| now - item.timestamp <= max_age);
        while self.items.len() > self.max_count {
            self.items.pop_front();
        }
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of items currently held, without pruning.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the window holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items a prune at `now` would keep, oldest first.
    ///
    /// Lets readers see the pruned window without mutating it.
    pub fn live(&self, now: DateTime<Utc>) -> impl Iterator<Item = &RecentVector> {
        let max_age = self.max_age;
        let fresh: Vec<&RecentVector> = self
            .items
            .iter()
            .filter(|item| now - item.timestamp <= max_age)
            .collect();
        let skip = fresh.len().saturating_sub(self.max_count);
        fresh.into_iter().skip(skip)
    }

    /// Per-tag frequency normalized to [0, 1]:
    /// `count(tag) / max(count of the most frequent tag, 1)`.
    pub fn frequency_weights(&self, now: DateTime<Utc>) -> HashMap<String, f64> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for item in self.live(now) {
            *counts.entry(item.tag.clone()).or_insert(0) += 1;
        }

        let max = counts.values().copied().max().unwrap_or(0).max(1) as f64;
        counts
            .into_iter()
            .map(|(tag, count)| (tag, count as f64 / max))
            .collect()
    }

    /// Frequency weight of a single tag; 0.0 when absent.
    pub fn frequency_weight(&self, tag: &str, now: DateTime<Utc>) -> f64 {
        self.frequency_weights(now).get(tag).copied().unwrap_or(0.0)
    }
}
