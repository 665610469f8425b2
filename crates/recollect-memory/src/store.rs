// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, insertion-ordered entry collection.
//!
//! Entries are append-only. The only removals are capacity eviction,
//! age expiry, removal by id, and clearing.

use chrono::{DateTime, Duration, Utc};
use recollect_core::EntryId;

use crate::types::{Entry, StoreDocument, FORMAT_VERSION};

/// How many entries a bounds pass dropped, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundsReport {
    /// Dropped because the store was over capacity.
    pub evicted: usize,
    /// Dropped because they were older than the age bound.
    pub expired: usize,
}

/// The in-memory entry store.
#[derive(Debug, Clone)]
pub struct EntryStore {
    entries: Vec<Entry>,
    last_updated: DateTime<Utc>,
}

impl EntryStore {
    /// Creates an empty store stamped with `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            entries: Vec::new(),
            last_updated: now,
        }
    }

    /// Rebuilds a store from its persisted form.
    pub fn from_document(document: StoreDocument) -> Self {
        Self {
            entries: document.entries,
            last_updated: document.last_updated,
        }
    }

    /// Snapshot of the store in its persisted form.
    pub fn to_document(&self) -> StoreDocument {
        StoreDocument {
            version: FORMAT_VERSION.to_string(),
            last_updated: self.last_updated,
            entries: self.entries.clone(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: Entry, now: DateTime<Utc>) {
        self.entries.push(entry);
        self.last_updated = now;
    }

    /// Applies capacity eviction, then age expiry.
    pub fn enforce_bounds(
        &mut self,
        max_entries: usize,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> BoundsReport {
        BoundsReport {
            evicted: self.evict_over_capacity(max_entries, now),
            expired: self.remove_older_than(max_age, now),
        }
    }

    /// Keeps only the `max_entries` most recently inserted entries.
    pub fn evict_over_capacity(&mut self, max_entries: usize, now: DateTime<Utc>) -> usize {
        let excess = self.entries.len().saturating_sub(max_entries);
        if excess > 0 {
            self.entries.drain(..excess);
            self.last_updated = now;
        }
        excess
    }

    /// Removes every entry whose age exceeds `max_age`.
    pub fn remove_older_than(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| now - entry.timestamp <= max_age);
        let removed = before - self.entries.len();
        if removed > 0 {
            self.last_updated = now;
        }
        removed
    }

    /// Removes the entry with `id`, if present.
    pub fn remove(&mut self, id: &EntryId, now: DateTime<Utc>) -> Option<Entry> {
        let index = self.entries.iter().position(|entry| &entry.id == id)?;
        self.last_updated = now;
        Some(self.entries.remove(index))
    }

    /// Empties the store and restamps it.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.entries.clear();
        self.last_updated = now;
    }

    /// Looks up an entry by id.
    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// All entries, oldest insertion first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When the store last changed.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }
}
