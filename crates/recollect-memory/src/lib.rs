// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contextual memory for the Recollect engine.
//!
//! Stores textual observations as entries carrying a small deterministic
//! feature vector, and ranks them by similarity, recency, and how often
//! their source showed up recently.
//!
//! ## Architecture
//!
//! - **vectorizer**: text to an 8-component feature descriptor
//! - **store**: bounded, insertion-ordered entry collection
//! - **recency**: short-lived window of recent vectors for frequency scoring
//! - **scorer**: similarity ranking and weighted ranking
//! - **persistence**: JSON snapshot file and the serialized background save queue
//! - **engine**: `MemoryEngine`, the single owner tying the pieces together
//! - **events**: change notifications and the status snapshot

pub mod engine;
pub mod events;
pub mod persistence;
pub mod recency;
pub mod scorer;
pub mod store;
pub mod types;
pub mod vectorizer;

pub use engine::{LoadOutcome, MemoryEngine};
pub use events::{EngineStatus, MemoryEvent};
pub use persistence::{JsonFileStore, SaveQueue, SnapshotStore};
pub use recency::RecencyWindow;
pub use store::EntryStore;
pub use types::*;
pub use vectorizer::{cosine_similarity, vectorize, FEATURE_DIMENSIONS};
