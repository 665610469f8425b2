// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering of ranked entries into plain-text context blocks.
//!
//! Every block is framed by a fixed header and [`FOOTER`] so downstream
//! prompts can find where injected context starts and stops.

use chrono::{DateTime, SecondsFormat, Utc};
use recollect_core::Backend;
use recollect_memory::{Entry, ScoredEntry};

/// Returned instead of an empty string when nothing is worth sending.
pub const NO_CONTEXT: &str = "No relevant context available.";

/// Closes every rendered block.
pub const FOOTER: &str = "=== END CONTEXT ===";

const SUMMARY_LABEL: &str = "Summary:";

fn header(kind: &str, backend: Backend) -> String {
    format!("=== {kind} (for {}) ===", backend.display_name())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// First `max_chars` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Renders ranked results as labeled blocks, followed by the summary.
///
/// With no results the summary text alone is returned, or [`NO_CONTEXT`]
/// when there is no summary either.
pub fn render_context(
    results: &[ScoredEntry],
    summary: Option<&str>,
    backend: Backend,
    include_scores: bool,
) -> String {
    if results.is_empty() {
        return summary.unwrap_or(NO_CONTEXT).to_string();
    }

    let mut out = header("RELEVANT CONTEXT", backend);
    out.push('\n');
    for (index, scored) in results.iter().enumerate() {
        let entry = &scored.entry;
        out.push_str(&format!(
            "[{}] source: {} | time: {}",
            index + 1,
            entry.source,
            timestamp(entry.timestamp)
        ));
        if include_scores {
            out.push_str(&format!(" | score: {:.3}", scored.score));
        }
        out.push('\n');
        out.push_str(&entry.content);
        out.push_str("\n\n");
    }
    if let Some(summary) = summary {
        out.push_str(SUMMARY_LABEL);
        out.push(' ');
        out.push_str(summary);
        out.push('\n');
    }
    out.push_str(FOOTER);
    out
}

/// Compact fallback: the summary plus a few recent entries, each cut to
/// `truncate_to` characters.
pub fn render_summarized(
    summary: &str,
    recent: &[Entry],
    backend: Backend,
    truncate_to: usize,
) -> String {
    let mut out = header("SUMMARIZED CONTEXT", backend);
    out.push('\n');
    out.push_str(SUMMARY_LABEL);
    out.push(' ');
    out.push_str(summary);
    out.push('\n');
    if !recent.is_empty() {
        out.push_str("Recent:\n");
        for entry in recent {
            out.push_str(&format!(
                "- [{}] {}\n",
                entry.source,
                truncate_chars(&entry.content, truncate_to)
            ));
        }
    }
    out.push_str(FOOTER);
    out
}
