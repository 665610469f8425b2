// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operations shared by the one-shot commands and the shell.

use std::collections::HashMap;

use colored::Colorize;
use recollect_config::model::RecollectConfig;
use recollect_context::ContextEngine;
use recollect_core::{EntryId, RecollectError};
use recollect_memory::{Entry, LoadOutcome, MemoryEngine, ScoredEntry};
use tracing::info;

/// One operation against the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add {
        content: String,
        source: String,
        metadata: HashMap<String, String>,
    },
    Remove {
        id: String,
    },
    Clear,
    Cleanup,
    Similar {
        query: String,
        limit: usize,
    },
    Weighted {
        query: String,
        limit: usize,
    },
    Recent {
        limit: usize,
    },
    Context {
        query: String,
        max_items: Option<usize>,
    },
    Summarized {
        query: String,
        max_chars: Option<usize>,
        summary: Option<String>,
    },
    Summary {
        text: String,
    },
    Status {
        json: bool,
    },
}

/// Parses a `key=value` metadata pair.
pub fn parse_meta(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got `{raw}`")),
    }
}

/// Opens the configured store and wraps it in a context engine.
pub async fn open_engine(config: &RecollectConfig) -> ContextEngine {
    let (memory, outcome) =
        MemoryEngine::open(config.memory.clone(), &config.storage.store_path).await;
    match &outcome {
        LoadOutcome::Loaded { entries } => {
            info!(entries, path = %config.storage.store_path, "memory opened");
        }
        LoadOutcome::Missing => {
            info!(path = %config.storage.store_path, "starting with an empty memory");
        }
        LoadOutcome::Reset { reason } => {
            eprintln!("{}: store was unreadable and has been reset ({reason})", "warning".yellow());
        }
    }
    ContextEngine::new(memory, config.context.clone())
}

/// Runs a single action against the configured store, then waits for the
/// resulting save.
pub async fn run_once(config: &RecollectConfig, action: Action) -> Result<(), RecollectError> {
    let mut engine = open_engine(config).await;
    let output = execute(&mut engine, action);
    println!("{output}");
    engine.into_memory().close().await
}

/// Applies `action` and renders its result for the terminal.
pub fn execute(engine: &mut ContextEngine, action: Action) -> String {
    match action {
        Action::Add {
            content,
            source,
            metadata,
        } => match engine.memory_mut().add_entry(&content, &source, metadata) {
            Some(entry) => format!("{} {}", "added".green(), entry.id),
            None => "nothing to add: content is blank".dimmed().to_string(),
        },
        Action::Remove { id } => match engine.memory_mut().remove_entry(&EntryId::from(id.as_str())) {
            Some(entry) => format!("{} {}", "removed".green(), entry.id),
            None => format!("no entry with id {id}").dimmed().to_string(),
        },
        Action::Clear => {
            let count = engine.memory().len();
            engine.memory_mut().clear();
            format!("cleared {count} entries")
        }
        Action::Cleanup => {
            let removed = engine.memory_mut().cleanup_old_entries();
            format!("removed {removed} expired entries")
        }
        Action::Similar { query, limit } => {
            render_scored(&engine.memory().find_similar_scored(&query, limit))
        }
        Action::Weighted { query, limit } => {
            render_scored(&engine.memory().find_weighted_scored(&query, limit))
        }
        Action::Recent { limit } => render_entries(&engine.memory().find_most_recent(limit)),
        Action::Context { query, max_items } => {
            let max_items = max_items.unwrap_or(engine.config().max_items);
            engine.assemble_context(&query, max_items)
        }
        Action::Summarized {
            query,
            max_chars,
            summary,
        } => {
            if let Some(summary) = summary {
                engine.record_summary(&summary);
            }
            let max_chars = max_chars.unwrap_or(engine.config().max_chars);
            engine.assemble_summarized_context(&query, max_chars)
        }
        Action::Summary { text } => {
            engine.record_summary(&text);
            match engine.summary().text() {
                Some(current) => format!("{} {current}", "summary:".green()),
                None => "no summary recorded".dimmed().to_string(),
            }
        }
        Action::Status { json } => crate::status::render_status(&engine.status(), json),
    }
}

fn entry_line(entry: &Entry) -> String {
    format!(
        "{} {} {} {}",
        entry.id.as_str().dimmed(),
        format!("[{}]", entry.source).cyan(),
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.content
    )
}

fn render_entries(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return "no entries".dimmed().to_string();
    }
    entries.iter().map(entry_line).collect::<Vec<_>>().join("\n")
}

fn render_scored(results: &[ScoredEntry]) -> String {
    if results.is_empty() {
        return "no matching entries".dimmed().to_string();
    }
    results
        .iter()
        .map(|s| format!("{} {}", format!("{:.3}", s.score).yellow(), entry_line(&s.entry)))
        .collect::<Vec<_>>()
        .join("\n")
}
