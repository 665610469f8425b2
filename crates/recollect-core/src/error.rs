// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Recollect memory engine.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across the Recollect crates.
///
/// Configuration problems are reported separately, as
/// `recollect_config::ConfigError` diagnostics, before an engine exists.
///
/// None of these are fatal to the engine: read failures reset the store,
/// write failures leave the in-memory state authoritative.
#[derive(Debug, Error)]
pub enum RecollectError {
    /// The store file is missing, unreadable, or malformed.
    #[error("failed to read store {}: {source}", path.display())]
    PersistenceRead {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The store file could not be written.
    #[error("failed to write store {}: {source}", path.display())]
    PersistenceWrite {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RecollectError {
    /// True for the two persistence kinds, which callers report as status
    /// rather than treat as failures.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            RecollectError::PersistenceRead { .. } | RecollectError::PersistenceWrite { .. }
        )
    }
}
