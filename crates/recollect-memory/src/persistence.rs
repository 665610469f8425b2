// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot persistence for the entry store.
//!
//! The whole store is written on every mutation, so writes are idempotent
//! and the newest document always wins. [`SaveQueue`] funnels every write
//! through one background task, coalescing bursts into a single write.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use recollect_core::RecollectError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::events::MemoryEvent;
use crate::types::StoreDocument;

/// Durable home of the store snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads the current document. `Ok(None)` means nothing was saved yet.
    async fn read(&self) -> Result<Option<StoreDocument>, RecollectError>;

    /// Replaces the stored document.
    async fn write(&self, document: &StoreDocument) -> Result<(), RecollectError>;

    /// Where the snapshot lives, for diagnostics.
    fn location(&self) -> PathBuf;
}

/// Snapshot kept as a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A sibling path unique to this write, so concurrent writers (other
    /// processes included) never share a half-written temp file.
    fn temp_path(&self) -> PathBuf {
        let mut name = std::ffi::OsString::from(".");
        name.push(
            self.path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "store".into()),
        );
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    fn read_error(&self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> RecollectError {
        RecollectError::PersistenceRead {
            path: self.path.clone(),
            source: source.into(),
        }
    }

    fn write_error(&self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> RecollectError {
        RecollectError::PersistenceWrite {
            path: self.path.clone(),
            source: source.into(),
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn read(&self) -> Result<Option<StoreDocument>, RecollectError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.read_error(e)),
        };
        let document = serde_json::from_slice(&bytes).map_err(|e| self.read_error(e))?;
        Ok(Some(document))
    }

    async fn write(&self, document: &StoreDocument) -> Result<(), RecollectError> {
        let json = serde_json::to_vec_pretty(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_error(e))?;
        }

        // Write beside the target, then rename, so readers never see a torn file.
        let temp = self.temp_path();
        let written = match tokio::fs::write(&temp, &json).await {
            Ok(()) => tokio::fs::rename(&temp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(self.write_error(e));
        }
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

enum SaveJob {
    Write(StoreDocument),
    Flush(oneshot::Sender<Result<(), String>>),
}

/// Serialized background writer for store snapshots.
///
/// Enqueueing never blocks. A single worker task drains the queue; when
/// several documents are waiting it writes only the newest one.
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveJob>,
    location: PathBuf,
    worker: JoinHandle<()>,
}

impl SaveQueue {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(store: Arc<dyn SnapshotStore>, events: broadcast::Sender<MemoryEvent>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let location = store.location();
        let worker = tokio::spawn(run_worker(rx, store, events));
        Self {
            tx,
            location,
            worker,
        }
    }

    /// Queues `document` for writing and returns immediately.
    pub fn enqueue(&self, document: StoreDocument) -> Result<(), RecollectError> {
        self.tx
            .send(SaveJob::Write(document))
            .map_err(|_| RecollectError::Internal("save worker has stopped".to_string()))
    }

    /// Waits until every document queued before this call has been handled.
    ///
    /// Returns the outcome of the most recent write attempt.
    pub async fn flush(&self) -> Result<(), RecollectError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(SaveJob::Flush(ack_tx))
            .map_err(|_| RecollectError::Internal("save worker has stopped".to_string()))?;
        let outcome = ack_rx
            .await
            .map_err(|_| RecollectError::Internal("save worker dropped flush".to_string()))?;
        outcome.map_err(|reason| RecollectError::PersistenceWrite {
            path: self.location.clone(),
            source: reason.into(),
        })
    }

    /// Queues `document` and waits for it to be written.
    pub async fn save(&self, document: StoreDocument) -> Result<(), RecollectError> {
        self.enqueue(document)?;
        self.flush().await
    }

    /// Drains outstanding work and stops the worker.
    pub async fn shutdown(self) -> Result<(), RecollectError> {
        let outcome = self.flush().await;
        drop(self.tx);
        if let Err(e) = self.worker.await {
            warn!(error = %e, "save worker ended abnormally");
        }
        outcome
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<SaveJob>,
    store: Arc<dyn SnapshotStore>,
    events: broadcast::Sender<MemoryEvent>,
) {
    let mut last: Result<(), String> = Ok(());

    while let Some(job) = rx.recv().await {
        let mut newest: Option<StoreDocument> = None;
        let mut waiters = Vec::new();

        let mut take = |job: SaveJob| match job {
            SaveJob::Write(document) => newest = Some(document),
            SaveJob::Flush(ack) => waiters.push(ack),
        };
        take(job);
        while let Ok(job) = rx.try_recv() {
            take(job);
        }

        if let Some(document) = newest {
            let entries = document.entries.len();
            last = match store.write(&document).await {
                Ok(()) => {
                    debug!(entries, path = %store.location().display(), "store snapshot written");
                    let _ = events.send(MemoryEvent::Persisted { entries });
                    Ok(())
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!(error = %reason, "store snapshot write failed");
                    let _ = events.send(MemoryEvent::PersistFailed {
                        reason: reason.clone(),
                    });
                    Err(reason)
                }
            };
        }

        for ack in waiters {
            let _ = ack.send(last.clone());
        }
    }

    debug!("save worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};
    use recollect_core::EntryId;

    use crate::types::{Entry, FORMAT_VERSION};

    fn document(n: usize) -> StoreDocument {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        StoreDocument {
            version: FORMAT_VERSION.to_string(),
            last_updated: at,
            entries: (0..n)
                .map(|i| Entry {
                    id: EntryId::from(format!("id-{i}")),
                    content: format!("entry {i}"),
                    vector: vec![0.1 * i as f64, 1.0 / 3.0],
                    timestamp: at,
                    source: "test".to_string(),
                    metadata: HashMap::from([("app".to_string(), "Notes".to_string())]),
                })
                .collect(),
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn read(&self) -> Result<Option<StoreDocument>, RecollectError> {
            Ok(None)
        }

        async fn write(&self, _document: &StoreDocument) -> Result<(), RecollectError> {
            Err(RecollectError::PersistenceWrite {
                path: self.location(),
                source: "disk full".into(),
            })
        }

        fn location(&self) -> PathBuf {
            PathBuf::from("/nowhere/memory.json")
        }
    }

    #[derive(Default)]
    struct CountingStore {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl SnapshotStore for CountingStore {
        async fn read(&self) -> Result<Option<StoreDocument>, RecollectError> {
            Ok(None)
        }

        async fn write(&self, _document: &StoreDocument) -> Result<(), RecollectError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn location(&self) -> PathBuf {
            PathBuf::from("counting.json")
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_then_read_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/dir/memory.json"));
        let doc = document(3);
        store.write(&doc).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(doc));
        let parent = dir.path().join("nested/dir");
        let names: Vec<_> = std::fs::read_dir(&parent)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("memory.json")]);
    }

    #[test]
    fn temp_paths_are_unique_hidden_siblings() {
        let store = JsonFileStore::new("/data/recollect/memory.json");
        let a = store.temp_path();
        let b = store.temp_path();
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/data/recollect")));
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".memory.json."));
        assert!(name.ends_with(".tmp"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_never_leave_a_torn_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");

        // Independent stores on one path behave like separate processes.
        let mut writers = Vec::new();
        for w in 0..4 {
            let store = JsonFileStore::new(&path);
            writers.push(tokio::spawn(async move {
                for round in 0..20 {
                    store.write(&document(1 + (w * 7 + round) % 12)).await.unwrap();
                }
            }));
        }
        for writer in writers {
            writer.await.unwrap();
        }

        let doc = JsonFileStore::new(&path).read().await.unwrap().unwrap();
        assert!(!doc.entries.is_empty());
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().file_name() != "memory.json")
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let err = JsonFileStore::new(&path).read().await.unwrap_err();
        assert!(matches!(err, RecollectError::PersistenceRead { .. }));
    }

    #[tokio::test]
    async fn queue_save_writes_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let file = Arc::new(JsonFileStore::new(dir.path().join("memory.json")));
        let (events, mut rx) = broadcast::channel(16);
        let queue = SaveQueue::spawn(file.clone(), events);

        queue.save(document(2)).await.unwrap();
        assert_eq!(file.read().await.unwrap().unwrap().entries.len(), 2);
        assert_eq!(rx.recv().await.unwrap(), MemoryEvent::Persisted { entries: 2 });
        queue.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn queue_failure_is_reported_not_fatal() {
        let (events, mut rx) = broadcast::channel(16);
        let queue = SaveQueue::spawn(Arc::new(FailingStore), events);

        let err = queue.save(document(1)).await.unwrap_err();
        assert!(matches!(err, RecollectError::PersistenceWrite { .. }));
        assert!(err.to_string().contains("disk full"));
        match rx.recv().await.unwrap() {
            MemoryEvent::PersistFailed { reason } => assert!(reason.contains("disk full")),
            other => panic!("unexpected event {other:?}"),
        }

        // The worker keeps serving after a failure.
        queue.enqueue(document(1)).unwrap();
        assert!(queue.flush().await.is_err());
    }

    #[tokio::test]
    async fn newest_document_wins() {
        let dir = tempfile::tempdir().unwrap();
        let file = Arc::new(JsonFileStore::new(dir.path().join("memory.json")));
        let (events, _rx) = broadcast::channel(64);
        let queue = SaveQueue::spawn(file.clone(), events);

        for n in 1..=10 {
            queue.enqueue(document(n)).unwrap();
        }
        queue.flush().await.unwrap();
        assert_eq!(file.read().await.unwrap().unwrap().entries.len(), 10);
    }

    #[tokio::test]
    async fn flush_with_nothing_queued_succeeds() {
        let counting = Arc::new(CountingStore::default());
        let (events, _rx) = broadcast::channel(4);
        let queue = SaveQueue::spawn(counting.clone(), events);
        queue.flush().await.unwrap();
        assert_eq!(counting.writes.load(Ordering::SeqCst), 0);
    }
}
