// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context assembly for Recollect.
//!
//! [`ContextEngine`] owns a [`MemoryEngine`] plus the running [`Summary`]
//! and turns ranked memory into size-bounded text blocks for a language
//! model prompt:
//! - **assemble_context**: weighted ranking rendered as labeled blocks
//! - **assemble_summarized_context**: the same, falling back to the summary
//!   and a few recent entries when over a character budget

pub mod assembler;
pub mod summary;

use recollect_config::model::ContextConfig;
use recollect_core::Backend;
use recollect_memory::{EngineStatus, MemoryEngine, MemoryEvent};
use serde::Serialize;
use tracing::debug;

pub use assembler::{render_context, render_summarized, truncate_chars, FOOTER, NO_CONTEXT};
pub use summary::Summary;

/// Status of the memory engine plus the context layer's own state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextStatus {
    #[serde(flatten)]
    pub memory: EngineStatus,
    pub has_summary: bool,
    pub backend: Backend,
}

/// Memory plus summary, assembled into prompt context.
///
/// Like the memory engine it wraps, mutations take `&mut self` and must be
/// serialized through one owner.
pub struct ContextEngine {
    memory: MemoryEngine,
    summary: Summary,
    config: ContextConfig,
}

impl ContextEngine {
    pub fn new(memory: MemoryEngine, config: ContextConfig) -> Self {
        Self {
            memory,
            summary: Summary::default(),
            config,
        }
    }

    pub fn memory(&self) -> &MemoryEngine {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryEngine {
        &mut self.memory
    }

    /// Gives back the memory engine, dropping the summary.
    pub fn into_memory(self) -> MemoryEngine {
        self.memory
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Overwrites the running summary. Blank text is ignored.
    pub fn record_summary(&mut self, text: &str) {
        if self.summary.record(text) {
            debug!(chars = text.trim().chars().count(), "summary recorded");
            self.memory.publish(MemoryEvent::SummaryRecorded);
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Renders up to `max_items` weighted results, with the summary.
    ///
    /// Never returns an empty string.
    pub fn assemble_context(&self, query: &str, max_items: usize) -> String {
        let results = self.memory.find_weighted_scored(query, max_items);
        let text = render_context(
            &results,
            self.summary.text(),
            self.config.backend,
            self.config.include_scores,
        );
        debug!(results = results.len(), chars = text.chars().count(), "context assembled");
        text
    }

    /// [`assemble_context`](Self::assemble_context) bounded by `max_chars`.
    ///
    /// Output within budget is returned as is. Otherwise the summary and the
    /// most recent entries are returned in a compact block, or
    /// [`NO_CONTEXT`] when there is no summary. The compact block is not
    /// shrunk further.
    pub fn assemble_summarized_context(&self, query: &str, max_chars: usize) -> String {
        let full = self.assemble_context(query, self.config.max_items);
        let length = full.chars().count();
        if length <= max_chars {
            return full;
        }

        let Some(summary) = self.summary.text() else {
            debug!(length, max_chars, "context over budget and no summary");
            return NO_CONTEXT.to_string();
        };
        let recent = self.memory.find_most_recent(self.config.summary_recent_items);
        debug!(length, max_chars, recent = recent.len(), "falling back to summary");
        render_summarized(
            summary,
            &recent,
            self.config.backend,
            self.config.summary_truncate_chars,
        )
    }

    pub fn status(&self) -> ContextStatus {
        ContextStatus {
            memory: self.memory.status(),
            has_summary: !self.summary.is_empty(),
            backend: self.config.backend,
        }
    }
}
