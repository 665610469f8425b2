// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Change notifications and the synchronous status snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use recollect_core::EntryId;
use serde::Serialize;

/// Something that happened to the engine's state.
///
/// Delivered over a `tokio::sync::broadcast` channel. Slow subscribers may
/// observe `RecvError::Lagged`; the engine never waits for them.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryEvent {
    /// A new entry was stored.
    EntryAdded { id: EntryId, source: String },
    /// An entry was removed by id.
    EntryRemoved { id: EntryId },
    /// Oldest entries dropped to respect the capacity bound.
    Evicted { count: usize },
    /// Entries dropped for exceeding the age bound.
    Expired { count: usize },
    /// The store was emptied.
    Cleared,
    /// A snapshot was loaded.
    Loaded { entries: usize },
    /// The snapshot was missing a usable document and the store started fresh.
    LoadReset { reason: String },
    /// A snapshot write completed.
    Persisted { entries: usize },
    /// A snapshot write failed. In-memory state is unaffected.
    PersistFailed { reason: String },
    /// The running summary was overwritten.
    SummaryRecorded,
}

/// Point-in-time view of the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub entry_count: usize,
    pub last_updated: DateTime<Utc>,
    pub recent_window_len: usize,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
    pub format_version: String,
    /// Entry count per source tag.
    pub sources: BTreeMap<String, usize>,
}
