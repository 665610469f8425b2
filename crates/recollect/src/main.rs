// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recollect - contextual memory and retrieval for local language models.
//!
//! This is the binary entry point: one-shot commands against the store
//! file, and an interactive shell that keeps a single engine alive.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod actions;
mod shell;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use recollect_config::model::RecollectConfig;

use crate::actions::{parse_meta, Action};

/// Recollect - contextual memory and retrieval for local language models.
#[derive(Parser, Debug)]
#[command(name = "recollect", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the default lookup.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a new observation.
    Add {
        content: String,
        /// Origin label, e.g. OCR or manual.
        #[arg(long, default_value = "manual")]
        source: String,
        /// Metadata as key=value; repeatable.
        #[arg(long = "meta", value_parser = parse_meta)]
        metadata: Vec<(String, String)>,
    },
    /// Remove an entry by id.
    Remove { id: String },
    /// Delete every entry.
    Clear,
    /// Remove entries older than the configured age.
    Cleanup,
    /// Rank entries by similarity to a query.
    Similar {
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Rank entries by similarity, recency, and source frequency.
    Weighted {
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// List the newest entries.
    Recent {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Assemble a context block for a query.
    Context {
        query: String,
        #[arg(long)]
        max_items: Option<usize>,
    },
    /// Assemble a context block within a character budget.
    Summarized {
        query: String,
        #[arg(long)]
        max_chars: Option<usize>,
        /// Record this summary before assembling.
        #[arg(long)]
        summary: Option<String>,
    },
    /// Show store statistics.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Launch an interactive shell.
    Shell,
}

impl Commands {
    fn into_action(self) -> Option<Action> {
        let action = match self {
            Commands::Add {
                content,
                source,
                metadata,
            } => Action::Add {
                content,
                source,
                metadata: metadata.into_iter().collect(),
            },
            Commands::Remove { id } => Action::Remove { id },
            Commands::Clear => Action::Clear,
            Commands::Cleanup => Action::Cleanup,
            Commands::Similar { query, limit } => Action::Similar { query, limit },
            Commands::Weighted { query, limit } => Action::Weighted { query, limit },
            Commands::Recent { limit } => Action::Recent { limit },
            Commands::Context { query, max_items } => Action::Context { query, max_items },
            Commands::Summarized {
                query,
                max_chars,
                summary,
            } => Action::Summarized {
                query,
                max_chars,
                summary,
            },
            Commands::Status { json } => Action::Status { json },
            Commands::Shell => return None,
        };
        Some(action)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => recollect_config::load_and_validate_path(path),
        None => recollect_config::load_and_validate(),
    };
    let config: RecollectConfig = match loaded {
        Ok(config) => config,
        Err(errors) => {
            recollect_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let Some(command) = cli.command else {
        println!("recollect: use --help for available commands");
        return;
    };

    let result = match command.into_action() {
        Some(action) => actions::run_once(&config, action).await,
        None => shell::run_shell(&config).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over the
/// configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recollect={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
