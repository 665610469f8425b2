// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory engine: single owner of the entry store and recency window.
//!
//! Every mutation takes `&mut self`, so callers sharing an engine must
//! serialize through one owner (an actor task or a mutex). Reads take
//! `&self` and see a consistent state. After each mutation the full store
//! is handed to the background [`SaveQueue`]; in-memory state is updated
//! first and never rolled back if the write later fails.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use recollect_config::model::MemoryConfig;
use recollect_core::{Clock, EntryId, RecollectError, SystemClock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{EngineStatus, MemoryEvent};
use crate::persistence::{JsonFileStore, SaveQueue, SnapshotStore};
use crate::recency::RecencyWindow;
use crate::scorer;
use crate::store::{BoundsReport, EntryStore};
use crate::types::{Entry, RecentVector, ScoredEntry, StoreDocument, FORMAT_VERSION};
use crate::vectorizer::{vectorize, FEATURE_DIMENSIONS};

/// Buffered events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 256;

/// Result of [`MemoryEngine::load`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A snapshot was read; `entries` survived bound enforcement.
    Loaded { entries: usize },
    /// No snapshot exists yet. The store is empty.
    Missing,
    /// The snapshot was unreadable or incompatible. The store is empty.
    Reset { reason: String },
}

struct Persistence {
    snapshot: Arc<dyn SnapshotStore>,
    queue: SaveQueue,
}

/// Bounded contextual memory with similarity and weighted retrieval.
pub struct MemoryEngine {
    config: MemoryConfig,
    clock: Arc<dyn Clock>,
    store: EntryStore,
    recent: RecencyWindow,
    events: broadcast::Sender<MemoryEvent>,
    persistence: Option<Persistence>,
}

impl MemoryEngine {
    /// An engine that never touches disk, on the system clock.
    pub fn in_memory(config: MemoryConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// An engine that never touches disk, reading time from `clock`.
    pub fn with_clock(config: MemoryConfig, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let recent = RecencyWindow::new(config.recent_max_count, config.recent_max_age_secs);
        Self {
            store: EntryStore::new(clock.now()),
            recent,
            config,
            clock,
            events,
            persistence: None,
        }
    }

    /// An engine persisting to `snapshot`. Spawns the save worker, so it
    /// must be called inside a tokio runtime. Call [`load`](Self::load)
    /// to pick up existing state.
    pub fn with_snapshot_store(
        config: MemoryConfig,
        clock: Arc<dyn Clock>,
        snapshot: Arc<dyn SnapshotStore>,
    ) -> Self {
        let mut engine = Self::with_clock(config, clock);
        let queue = SaveQueue::spawn(snapshot.clone(), engine.events.clone());
        engine.persistence = Some(Persistence { snapshot, queue });
        engine
    }

    /// Opens the JSON store at `path` and loads it.
    pub async fn open(config: MemoryConfig, path: impl Into<PathBuf>) -> (Self, LoadOutcome) {
        let snapshot = Arc::new(JsonFileStore::new(path));
        let mut engine = Self::with_snapshot_store(config, Arc::new(SystemClock), snapshot);
        let outcome = engine.load().await;
        (engine, outcome)
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<MemoryEvent> {
        self.events.subscribe()
    }

    /// Broadcasts `event` to subscribers on behalf of a layer built over
    /// the engine.
    pub fn publish(&self, event: MemoryEvent) {
        self.emit(event);
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Current time according to the engine's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Stores `content` as a new entry.
    ///
    /// Whitespace-only content is ignored and returns `None`. Otherwise the
    /// trimmed text is vectorized, appended, fed to the recency window, and
    /// the store's bounds are enforced before a save is queued.
    pub fn add_entry(
        &mut self,
        content: &str,
        source: &str,
        metadata: HashMap<String, String>,
    ) -> Option<Entry> {
        let content = content.trim();
        if content.is_empty() {
            debug!(source, "ignoring empty entry");
            return None;
        }

        let now = self.clock.now();
        let entry = Entry {
            id: EntryId(Uuid::new_v4().to_string()),
            content: content.to_string(),
            vector: vectorize(content),
            timestamp: now,
            source: source.to_string(),
            metadata,
        };

        self.store.push(entry.clone(), now);
        self.recent.insert(RecentVector::from_entry(&entry), now);
        debug!(id = %entry.id, source, chars = content.chars().count(), "entry added");
        self.emit(MemoryEvent::EntryAdded {
            id: entry.id.clone(),
            source: entry.source.clone(),
        });

        let report = self.enforce_bounds(now);
        if report.expired > 0 || report.evicted > 0 {
            debug!(evicted = report.evicted, expired = report.expired, "bounds enforced");
        }
        self.persist();
        Some(entry)
    }

    /// Removes the entry with `id`. Absent ids are a no-op.
    pub fn remove_entry(&mut self, id: &EntryId) -> Option<Entry> {
        let now = self.clock.now();
        let removed = self.store.remove(id, now)?;
        debug!(%id, "entry removed");
        self.emit(MemoryEvent::EntryRemoved { id: id.clone() });
        self.persist();
        Some(removed)
    }

    /// Empties the store and the recency window.
    pub fn clear(&mut self) {
        let now = self.clock.now();
        let count = self.store.len();
        self.store.clear(now);
        self.recent.clear();
        info!(removed = count, "memory cleared");
        self.emit(MemoryEvent::Cleared);
        self.persist();
    }

    /// Removes entries older than the configured age bound. Returns how
    /// many were removed.
    pub fn cleanup_old_entries(&mut self) -> usize {
        let now = self.clock.now();
        let expired = self.store.remove_older_than(self.max_entry_age(), now);
        if expired > 0 {
            info!(expired, "expired old entries");
            self.emit(MemoryEvent::Expired { count: expired });
            self.persist();
        }
        expired
    }

    /// Entries most similar to `query`, best first.
    pub fn find_similar(&self, query: &str, limit: usize) -> Vec<Entry> {
        into_entries(self.find_similar_scored(query, limit))
    }

    /// [`find_similar`](Self::find_similar) with the final scores.
    pub fn find_similar_scored(&self, query: &str, limit: usize) -> Vec<ScoredEntry> {
        let query_vector = vectorize(query);
        let ranked = scorer::rank_similar(
            self.store.entries(),
            &query_vector,
            &self.config,
            self.clock.now(),
            limit,
        );
        debug!(candidates = self.store.len(), results = ranked.len(), "similarity pass");
        ranked
    }

    /// Entries ranked by blended similarity, recency, and source frequency.
    pub fn find_weighted(&self, query: &str, limit: usize) -> Vec<Entry> {
        into_entries(self.find_weighted_scored(query, limit))
    }

    /// [`find_weighted`](Self::find_weighted) with the weighted scores.
    pub fn find_weighted_scored(&self, query: &str, limit: usize) -> Vec<ScoredEntry> {
        let now = self.clock.now();
        let query_vector = vectorize(query);
        let frequencies = self.recent.frequency_weights(now);
        let ranked = scorer::rank_weighted(
            self.store.entries(),
            &query_vector,
            &frequencies,
            &self.config,
            now,
            limit,
        );
        debug!(
            candidates = self.store.len(),
            window = frequencies.len(),
            results = ranked.len(),
            "weighted pass"
        );
        ranked
    }

    /// The `limit` newest entries, newest first.
    pub fn find_most_recent(&self, limit: usize) -> Vec<Entry> {
        scorer::most_recent(self.store.entries(), limit)
    }

    /// Normalized recent frequency of `tag`, in [0, 1].
    pub fn frequency_weight(&self, tag: &str) -> f64 {
        self.recent.frequency_weight(tag, self.clock.now())
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.store.get(id)
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[Entry] {
        self.store.entries()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Snapshot of the engine's current state.
    pub fn status(&self) -> EngineStatus {
        let entries = self.store.entries();
        let mut sources = BTreeMap::new();
        for entry in entries {
            *sources.entry(entry.source.clone()).or_insert(0) += 1;
        }
        EngineStatus {
            entry_count: entries.len(),
            last_updated: self.store.last_updated(),
            recent_window_len: self.recent.live(self.clock.now()).count(),
            oldest: entries.iter().map(|e| e.timestamp).min(),
            newest: entries.iter().map(|e| e.timestamp).max(),
            format_version: FORMAT_VERSION.to_string(),
            sources,
        }
    }

    /// Replaces in-memory state with the persisted snapshot.
    ///
    /// Never fails: a missing snapshot yields an empty store, and an
    /// unreadable or incompatible one resets to an empty store and is
    /// reported through the outcome and a `LoadReset` event. The recency
    /// window always starts empty. An engine without a snapshot store keeps
    /// its state and reports `Missing`.
    pub async fn load(&mut self) -> LoadOutcome {
        let Some(persistence) = &self.persistence else {
            return LoadOutcome::Missing;
        };

        // Let queued writes land before reading them back.
        if let Err(e) = persistence.queue.flush().await {
            warn!(error = %e, "pending save failed before load");
        }

        let location = persistence.snapshot.location();
        let read = persistence.snapshot.read().await;
        let now = self.clock.now();
        self.recent.clear();

        let document = match read {
            Ok(Some(document)) => match check_document(&document) {
                Ok(()) => document,
                Err(reason) => return self.reset(reason, now),
            },
            Ok(None) => {
                info!(path = %location.display(), "no store snapshot, starting empty");
                self.store = EntryStore::new(now);
                return LoadOutcome::Missing;
            }
            Err(e) => return self.reset(e.to_string(), now),
        };

        self.store = EntryStore::from_document(document);
        let report = self.enforce_bounds(now);
        if report.evicted > 0 || report.expired > 0 {
            self.persist();
        }

        let entries = self.store.len();
        info!(path = %location.display(), entries, "store loaded");
        self.emit(MemoryEvent::Loaded { entries });
        LoadOutcome::Loaded { entries }
    }

    /// Writes the current store and waits for the write. Without a
    /// snapshot store this is a successful no-op.
    pub async fn save(&self) -> Result<(), RecollectError> {
        match &self.persistence {
            Some(persistence) => persistence.queue.save(self.store.to_document()).await,
            None => Ok(()),
        }
    }

    /// Waits for every save queued so far.
    pub async fn flush(&self) -> Result<(), RecollectError> {
        match &self.persistence {
            Some(persistence) => persistence.queue.flush().await,
            None => Ok(()),
        }
    }

    /// Drains pending saves and stops the save worker.
    pub async fn close(self) -> Result<(), RecollectError> {
        match self.persistence {
            Some(persistence) => persistence.queue.shutdown().await,
            None => Ok(()),
        }
    }

    fn max_entry_age(&self) -> Duration {
        Duration::days(i64::from(self.config.max_entry_age_days))
    }

    fn enforce_bounds(&mut self, now: DateTime<Utc>) -> BoundsReport {
        let report = self
            .store
            .enforce_bounds(self.config.max_entries, self.max_entry_age(), now);
        if report.evicted > 0 {
            self.emit(MemoryEvent::Evicted {
                count: report.evicted,
            });
        }
        if report.expired > 0 {
            self.emit(MemoryEvent::Expired {
                count: report.expired,
            });
        }
        report
    }

    fn reset(&mut self, reason: String, now: DateTime<Utc>) -> LoadOutcome {
        warn!(reason = %reason, "store snapshot unusable, starting empty");
        self.store = EntryStore::new(now);
        self.emit(MemoryEvent::LoadReset {
            reason: reason.clone(),
        });
        LoadOutcome::Reset { reason }
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.queue.enqueue(self.store.to_document()) {
                warn!(error = %e, "could not queue store save");
            }
        }
    }

    fn emit(&self, event: MemoryEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn into_entries(scored: Vec<ScoredEntry>) -> Vec<Entry> {
    scored.into_iter().map(|s| s.entry).collect()
}

/// Rejects documents this build cannot score against.
fn check_document(document: &StoreDocument) -> Result<(), String> {
    if document.version != FORMAT_VERSION {
        return Err(format!(
            "unsupported store format version {:?} (expected {FORMAT_VERSION:?})",
            document.version
        ));
    }
    if let Some(entry) = document
        .entries
        .iter()
        .find(|e| e.vector.len() != FEATURE_DIMENSIONS)
    {
        return Err(format!(
            "entry {} has a {}-component vector (expected {FEATURE_DIMENSIONS})",
            entry.id,
            entry.vector.len()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use recollect_core::ManualClock;
    use tracing_test::traced_test;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn engine(config: MemoryConfig) -> (MemoryEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        (MemoryEngine::with_clock(config, clock.clone()), clock)
    }

    fn meta(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn whitespace_content_is_a_no_op() {
        let (mut engine, _) = engine(MemoryConfig::default());
        let mut events = engine.subscribe();
        assert!(engine.add_entry("   \n\t ", "manual", HashMap::new()).is_none());
        assert_eq!(engine.len(), 0);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn add_trims_and_vectorizes() {
        let (mut engine, _) = engine(MemoryConfig::default());
        let entry = engine
            .add_entry("  quarterly report draft  ", "OCR", meta(&[("app", "Pages")]))
            .unwrap();
        assert_eq!(entry.content, "quarterly report draft");
        assert_eq!(entry.vector, vectorize("quarterly report draft"));
        assert_eq!(entry.timestamp, t0());
        assert_eq!(engine.get(&entry.id), Some(&entry));
        assert_eq!(engine.frequency_weight("Pages"), 1.0);
    }

    #[test]
    fn ids_are_unique() {
        let (mut engine, _) = engine(MemoryConfig::default());
        let a = engine.add_entry("same", "s", HashMap::new()).unwrap();
        let b = engine.add_entry("same", "s", HashMap::new()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn capacity_evicts_oldest_insertions() {
        let config = MemoryConfig {
            max_entries: 3,
            ..MemoryConfig::default()
        };
        let (mut engine, clock) = engine(config);
        let mut events = engine.subscribe();
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(engine.add_entry(&format!("note {i}"), "s", HashMap::new()).unwrap().id);
            clock.advance(Duration::seconds(1));
        }
        let kept: Vec<&EntryId> = engine.entries().iter().map(|e| &e.id).collect();
        assert_eq!(kept, ids[2..].iter().collect::<Vec<_>>());

        let mut evictions = 0;
        while let Ok(event) = events.try_recv() {
            if let MemoryEvent::Evicted { count } = event {
                evictions += count;
            }
        }
        assert_eq!(evictions, 2);
    }

    #[test]
    fn insertion_expires_entries_past_the_age_bound() {
        let config = MemoryConfig {
            max_entry_age_days: 1,
            ..MemoryConfig::default()
        };
        let (mut engine, clock) = engine(config);
        engine.add_entry("old news", "s", HashMap::new());
        clock.advance(Duration::days(2));
        engine.add_entry("fresh news", "s", HashMap::new());
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.entries()[0].content, "fresh news");
    }

    #[test]
    fn cleanup_removes_only_expired() {
        let (mut engine, clock) = engine(MemoryConfig::default());
        engine.add_entry("first", "s", HashMap::new());
        clock.advance(Duration::days(20));
        engine.add_entry("second", "s", HashMap::new());
        assert_eq!(engine.cleanup_old_entries(), 0);

        clock.advance(Duration::days(11));
        assert_eq!(engine.cleanup_old_entries(), 1);
        assert_eq!(engine.entries()[0].content, "second");
    }

    #[test]
    fn remove_and_clear() {
        let (mut engine, clock) = engine(MemoryConfig::default());
        let a = engine.add_entry("alpha", "s", HashMap::new()).unwrap();
        engine.add_entry("beta", "s", HashMap::new());

        assert!(engine.remove_entry(&EntryId::from("missing")).is_none());
        assert_eq!(engine.remove_entry(&a.id).unwrap().content, "alpha");
        assert_eq!(engine.len(), 1);

        clock.advance(Duration::minutes(1));
        engine.clear();
        assert!(engine.is_empty());
        assert_eq!(engine.status().last_updated, t0() + Duration::minutes(1));
        assert_eq!(engine.status().recent_window_len, 0);
    }

    #[test]
    fn most_recent_is_newest_first() {
        let (mut engine, clock) = engine(MemoryConfig::default());
        for word in ["one", "two", "three"] {
            engine.add_entry(word, "s", HashMap::new());
            clock.advance(Duration::seconds(1));
        }
        let recent: Vec<String> = engine
            .find_most_recent(2)
            .into_iter()
            .map(|e| e.content)
            .collect();
        assert_eq!(recent, vec!["three", "two"]);
    }

    #[test]
    fn weighted_prefers_frequent_source() {
        let (mut engine, _) = engine(MemoryConfig::default());
        let text = "meeting notes for the design review";
        engine.add_entry(text, "Slack", HashMap::new());
        engine.add_entry(text, "Slack", HashMap::new());
        engine.add_entry(text, "Slack", HashMap::new());
        engine.add_entry(text, "Mail", HashMap::new());

        let ranked = engine.find_weighted_scored(text, 10);
        let slack = ranked.iter().find(|s| s.entry.source == "Slack").unwrap();
        let mail = ranked.iter().find(|s| s.entry.source == "Mail").unwrap();
        assert!(slack.score >= mail.score);
        assert!((engine.frequency_weight("Mail") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn frequency_signal_fades_with_the_window() {
        let (mut engine, clock) = engine(MemoryConfig::default());
        engine.add_entry("hello", "Terminal", HashMap::new());
        assert_eq!(engine.frequency_weight("Terminal"), 1.0);
        clock.advance(Duration::seconds(301));
        assert_eq!(engine.frequency_weight("Terminal"), 0.0);
    }

    #[test]
    fn status_reports_sources_and_span() {
        let (mut engine, clock) = engine(MemoryConfig::default());
        engine.add_entry("a", "OCR", HashMap::new());
        clock.advance(Duration::seconds(5));
        engine.add_entry("b", "OCR", HashMap::new());
        engine.add_entry("c", "manual", HashMap::new());

        let status = engine.status();
        assert_eq!(status.entry_count, 3);
        assert_eq!(status.oldest, Some(t0()));
        assert_eq!(status.newest, Some(t0() + Duration::seconds(5)));
        assert_eq!(status.sources.get("OCR"), Some(&2));
        assert_eq!(status.sources.get("manual"), Some(&1));
        assert_eq!(status.format_version, FORMAT_VERSION);
        assert_eq!(status.recent_window_len, 3);
    }

    #[traced_test]
    #[test]
    fn clear_is_logged() {
        let (mut engine, _) = engine(MemoryConfig::default());
        engine.add_entry("something", "s", HashMap::new());
        engine.clear();
        assert!(logs_contain("memory cleared"));
    }

    #[tokio::test]
    async fn in_memory_save_and_load_are_no_ops() {
        let (mut engine, _) = engine(MemoryConfig::default());
        engine.add_entry("kept", "s", HashMap::new());
        engine.save().await.unwrap();
        assert_eq!(engine.load().await, LoadOutcome::Missing);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn check_document_rejects_foreign_versions_and_vectors() {
        let mut doc = StoreDocument {
            version: "0".to_string(),
            last_updated: t0(),
            entries: Vec::new(),
        };
        assert!(check_document(&doc).unwrap_err().contains("version"));

        doc.version = FORMAT_VERSION.to_string();
        doc.entries.push(Entry {
            id: EntryId::from("x"),
            content: "x".to_string(),
            vector: vec![1.0, 2.0],
            timestamp: t0(),
            source: "s".to_string(),
            metadata: HashMap::new(),
        });
        assert!(check_document(&doc).unwrap_err().contains("2-component"));
    }

    fn ids(entries: &[Entry]) -> Vec<EntryId> {
        entries.iter().map(|e| e.id.clone()).collect()
    }

    fn populated() -> MemoryEngine {
        let (mut engine, clock) = engine(MemoryConfig::default());
        for (content, app) in [
            ("budget spreadsheet for march", "Numbers"),
            ("march travel budget notes", "Notes"),
            ("meeting notes with design team", "Notes"),
            ("budget", "Mail"),
            ("unrelated grocery list", "Reminders"),
        ] {
            engine.add_entry(content, "OCR", meta(&[("app", app)]));
            clock.advance(Duration::minutes(5));
        }
        engine
    }

    #[test]
    fn find_similar_matches_scored_order() {
        let engine = populated();
        for limit in [1, 3, 10] {
            let scored: Vec<Entry> = engine
                .find_similar_scored("march travel budget notes", limit)
                .into_iter()
                .map(|s| s.entry)
                .collect();
            let plain = engine.find_similar("march travel budget notes", limit);
            assert!(!plain.is_empty());
            assert_eq!(ids(&plain), ids(&scored));
            assert_eq!(plain, scored);
        }
    }

    #[test]
    fn find_weighted_matches_scored_order() {
        let engine = populated();
        for limit in [1, 3, 10] {
            let scored: Vec<Entry> = engine
                .find_weighted_scored("march travel budget notes", limit)
                .into_iter()
                .map(|s| s.entry)
                .collect();
            let plain = engine.find_weighted("march travel budget notes", limit);
            assert!(!plain.is_empty());
            assert_eq!(ids(&plain), ids(&scored));
            assert_eq!(plain, scored);
        }
    }
}
