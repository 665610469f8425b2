// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types: entries, scored results, and the persisted document.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use recollect_core::EntryId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Format tag written into every store document.
pub const FORMAT_VERSION: &str = "1";

/// Metadata key naming the application an observation came from.
pub const APP_METADATA_KEY: &str = "app";

/// Metadata key carrying an application bundle identifier.
pub const BUNDLE_METADATA_KEY: &str = "bundle";

/// A single stored observation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier.
    pub id: EntryId,
    /// Trimmed text content.
    pub content: String,
    /// Feature vector produced by the vectorizer.
    pub vector: Vec<f64>,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Label of where the text came from (e.g. "OCR", "manual").
    pub source: String,
    /// Free-form string metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Entry {
    /// The tag used for frequency scoring: the `app` metadata key, else
    /// `bundle`, else the source label.
    pub fn app_tag(&self) -> &str {
        self.metadata
            .get(APP_METADATA_KEY)
            .or_else(|| self.metadata.get(BUNDLE_METADATA_KEY))
            .map(String::as_str)
            .unwrap_or(&self.source)
    }
}

/// An entry together with the score that ranked it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: Entry,
    pub score: f64,
}

/// An ephemeral record in the recency window. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentVector {
    pub vector: Vec<f64>,
    pub timestamp: DateTime<Utc>,
    /// App/source tag counted for frequency scoring.
    pub tag: String,
    /// Short digest of the content, kept for frequency analytics.
    pub content_key: String,
}

impl RecentVector {
    /// Builds the window record for a freshly stored entry.
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            vector: entry.vector.clone(),
            timestamp: entry.timestamp,
            tag: entry.app_tag().to_string(),
            content_key: content_key(&entry.content),
        }
    }
}

/// The persisted form of the entry store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

/// First 16 hex characters of the SHA-256 of `content`.
pub fn content_key(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(source: &str, metadata: &[(&str, &str)]) -> Entry {
        Entry {
            id: EntryId::from("e-1"),
            content: "hello".to_string(),
            vector: vec![0.1; 8],
            timestamp: Utc::now(),
            source: source.to_string(),
            metadata: metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn app_tag_prefers_app_then_bundle_then_source() {
        let e = entry_with("OCR", &[("app", "Xcode"), ("bundle", "com.apple.dt.Xcode")]);
        assert_eq!(e.app_tag(), "Xcode");

        let e = entry_with("OCR", &[("bundle", "com.apple.Safari")]);
        assert_eq!(e.app_tag(), "com.apple.Safari");

        let e = entry_with("OCR", &[]);
        assert_eq!(e.app_tag(), "OCR");
    }

    #[test]
    fn content_key_is_stable_and_short() {
        let a = content_key("the same text");
        let b = content_key("the same text");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, content_key("other text"));
    }

    #[test]
    fn recent_vector_copies_entry_fields() {
        let e = entry_with("manual", &[("app", "Notes")]);
        let rv = RecentVector::from_entry(&e);
        assert_eq!(rv.tag, "Notes");
        assert_eq!(rv.timestamp, e.timestamp);
        assert_eq!(rv.vector, e.vector);
    }

    #[test]
    fn entry_json_without_metadata_defaults_to_empty() {
        let json = r#"{"id":"x","content":"c","vector":[0.5],"timestamp":"2026-03-01T00:00:00Z","source":"s"}"#;
        let e: Entry = serde_json::from_str(json).unwrap();
        assert!(e.metadata.is_empty());
        assert_eq!(e.id.as_str(), "x");
    }
}
