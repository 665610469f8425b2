// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Recollect memory engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use recollect_core::Backend;
use serde::{Deserialize, Serialize};

/// Top-level Recollect configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecollectConfig {
    /// Entry store bounds and retrieval scoring tunables.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Where the store snapshot lives.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Context assembly settings.
    #[serde(default)]
    pub context: ContextConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Entry store bounds and retrieval scoring configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Maximum number of entries kept; the oldest are evicted first.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Entries older than this many days are removed on cleanup.
    #[serde(default = "default_max_entry_age_days")]
    pub max_entry_age_days: u32,

    /// Capacity of the recency window used for frequency scoring.
    #[serde(default = "default_recent_max_count")]
    pub recent_max_count: usize,

    /// Age in seconds after which a vector leaves the recency window.
    #[serde(default = "default_recent_max_age_secs")]
    pub recent_max_age_secs: u64,

    /// Half-life in seconds of the exponential recency decay.
    #[serde(default = "default_recency_half_life_secs")]
    pub recency_half_life_secs: f64,

    /// Plain similarity ranking keeps scores strictly above this.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Weighted ranking keeps scores strictly above this.
    #[serde(default = "default_weighted_threshold")]
    pub weighted_threshold: f64,

    /// Coefficient of cosine similarity in the weighted score.
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f64,

    /// Coefficient of recency decay in the weighted score.
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    /// Coefficient of source frequency in the weighted score.
    #[serde(default = "default_frequency_weight")]
    pub frequency_weight: f64,

    /// Flat bonus added to plain similarity for young entries.
    #[serde(default = "default_recency_bonus")]
    pub recency_bonus: f64,

    /// Entries younger than this many hours receive the recency bonus.
    #[serde(default = "default_recency_bonus_window_hours")]
    pub recency_bonus_window_hours: u32,

    /// Upper bound of a boosted similarity score.
    #[serde(default = "default_score_cap")]
    pub score_cap: f64,

    /// Similarity scores closer than this are ordered newest first.
    #[serde(default = "default_tie_window")]
    pub tie_window: f64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_entry_age_days: default_max_entry_age_days(),
            recent_max_count: default_recent_max_count(),
            recent_max_age_secs: default_recent_max_age_secs(),
            recency_half_life_secs: default_recency_half_life_secs(),
            similarity_threshold: default_similarity_threshold(),
            weighted_threshold: default_weighted_threshold(),
            similarity_weight: default_similarity_weight(),
            recency_weight: default_recency_weight(),
            frequency_weight: default_frequency_weight(),
            recency_bonus: default_recency_bonus(),
            recency_bonus_window_hours: default_recency_bonus_window_hours(),
            score_cap: default_score_cap(),
            tie_window: default_tie_window(),
        }
    }
}

fn default_max_entries() -> usize {
    1000
}

fn default_max_entry_age_days() -> u32 {
    30
}

fn default_recent_max_count() -> usize {
    100
}

fn default_recent_max_age_secs() -> u64 {
    300 // 5 minutes
}

fn default_recency_half_life_secs() -> f64 {
    120.0
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_weighted_threshold() -> f64 {
    0.15
}

fn default_similarity_weight() -> f64 {
    0.6
}

fn default_recency_weight() -> f64 {
    0.25
}

fn default_frequency_weight() -> f64 {
    0.15
}

fn default_recency_bonus() -> f64 {
    0.1
}

fn default_recency_bonus_window_hours() -> u32 {
    24
}

fn default_score_cap() -> f64 {
    1.0
}

fn default_tie_window() -> f64 {
    0.05
}

/// Store snapshot location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the JSON store file.
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

fn default_store_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("recollect").join("memory.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("recollect-memory.json"))
        .to_string_lossy()
        .into_owned()
}

/// Context assembly configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Default number of ranked entries rendered into a context block.
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Default character budget for summarized context.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Recent entries appended to the summary fallback block.
    #[serde(default = "default_summary_recent_items")]
    pub summary_recent_items: usize,

    /// Characters of each entry kept in the summary fallback block.
    #[serde(default = "default_summary_truncate_chars")]
    pub summary_truncate_chars: usize,

    /// Annotate rendered entries with their weighted score.
    #[serde(default = "default_include_scores")]
    pub include_scores: bool,

    /// Backend the assembled context is written for.
    #[serde(default)]
    pub backend: Backend,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            max_chars: default_max_chars(),
            summary_recent_items: default_summary_recent_items(),
            summary_truncate_chars: default_summary_truncate_chars(),
            include_scores: default_include_scores(),
            backend: Backend::default(),
        }
    }
}

fn default_max_items() -> usize {
    5
}

fn default_max_chars() -> usize {
    4000
}

fn default_summary_recent_items() -> usize {
    3
}

fn default_summary_truncate_chars() -> usize {
    100
}

fn default_include_scores() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
