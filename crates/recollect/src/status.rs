// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recollect status` rendering.
//!
//! Human-readable by default, or structured JSON for scripting.

use chrono::{DateTime, Utc};
use colored::Colorize;
use recollect_context::ContextStatus;

fn stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Renders `status` as an aligned report, or as pretty JSON when `json`.
pub fn render_status(status: &ContextStatus, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(status)
            .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"));
    }

    let memory = &status.memory;
    let span = match (memory.oldest, memory.newest) {
        (Some(oldest), Some(newest)) => format!("{} .. {}", stamp(oldest), stamp(newest)),
        _ => "empty".to_string(),
    };
    let locality = if status.backend.is_local() { "local" } else { "remote" };

    let mut lines = vec![
        "recollect memory".bold().to_string(),
        format!("  entries:        {}", memory.entry_count),
        format!("  last updated:   {}", stamp(memory.last_updated)),
        format!("  recent window:  {}", memory.recent_window_len),
        format!("  span:           {span}"),
        format!(
            "  summary:        {}",
            if status.has_summary { "yes" } else { "no" }
        ),
        format!("  backend:        {} ({locality})", status.backend.display_name()),
        format!("  format:         v{}", memory.format_version),
    ];
    if !memory.sources.is_empty() {
        lines.push("  sources:".to_string());
        for (source, count) in &memory.sources {
            lines.push(format!("    {source:<14}{count}"));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use recollect_core::Backend;
    use recollect_memory::EngineStatus;
    use std::collections::BTreeMap;

    fn status() -> ContextStatus {
        let at = Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap();
        ContextStatus {
            memory: EngineStatus {
                entry_count: 3,
                last_updated: at,
                recent_window_len: 1,
                oldest: Some(at),
                newest: Some(at),
                format_version: "1".to_string(),
                sources: BTreeMap::from([("OCR".to_string(), 2), ("manual".to_string(), 1)]),
            },
            has_summary: true,
            backend: Backend::LlamaCpp,
        }
    }

    #[test]
    fn text_report_lists_sources() {
        colored::control::set_override(false);
        let text = render_status(&status(), false);
        assert!(text.contains("entries:        3"));
        assert!(text.contains("backend:        llama.cpp (local)"));
        assert!(text.contains("summary:        yes"));
        assert!(text.contains("    OCR           2"));
    }

    #[test]
    fn json_report_is_flat() {
        let text = render_status(&status(), true);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["entry_count"], 3);
        assert_eq!(value["has_summary"], true);
        assert_eq!(value["backend"], "llama_cpp");
        assert_eq!(value["sources"]["OCR"], 2);
    }
}
