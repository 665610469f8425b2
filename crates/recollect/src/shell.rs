// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recollect shell` command implementation.
//!
//! Keeps one engine open for the whole session, so the running summary
//! (which is never persisted) survives from line to line.

use std::collections::HashMap;

use colored::Colorize;
use recollect_config::model::RecollectConfig;
use recollect_core::RecollectError;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::actions::{self, Action};

const DEFAULT_LIMIT: usize = 5;

const HELP: &str = "\
commands:
  add <text>            store an observation
  remove <id>           remove an entry
  clear                 delete every entry
  cleanup               drop entries past the age limit
  similar <query>       rank by similarity
  weighted <query>      rank by similarity, recency, and frequency
  recent [n]            newest entries
  context <query>       assemble a context block
  summarized <query>    assemble within the character budget
  summary <text>        replace the running summary
  status                store statistics
  /quit                 leave the shell";

/// A parsed shell line.
#[derive(Debug, PartialEq)]
enum ShellCommand {
    Run(Action),
    Help,
    Quit,
}

fn required<'a>(rest: &'a str, command: &str, what: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("`{command}` needs {what}"))
    } else {
        Ok(rest)
    }
}

fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let action = match command {
        "/quit" | "/exit" | "quit" | "exit" => return Ok(ShellCommand::Quit),
        "help" | "?" => return Ok(ShellCommand::Help),
        "add" => Action::Add {
            content: required(rest, command, "some text")?.to_string(),
            source: "manual".to_string(),
            metadata: HashMap::new(),
        },
        "remove" => Action::Remove {
            id: required(rest, command, "an id")?.to_string(),
        },
        "clear" => Action::Clear,
        "cleanup" => Action::Cleanup,
        "similar" => Action::Similar {
            query: required(rest, command, "a query")?.to_string(),
            limit: DEFAULT_LIMIT,
        },
        "weighted" => Action::Weighted {
            query: required(rest, command, "a query")?.to_string(),
            limit: DEFAULT_LIMIT,
        },
        "recent" => {
            let limit = if rest.is_empty() {
                DEFAULT_LIMIT
            } else {
                rest.parse()
                    .map_err(|_| format!("`recent` takes a count, got `{rest}`"))?
            };
            Action::Recent { limit }
        }
        "context" => Action::Context {
            query: required(rest, command, "a query")?.to_string(),
            max_items: None,
        },
        "summarized" => Action::Summarized {
            query: required(rest, command, "a query")?.to_string(),
            max_chars: None,
            summary: None,
        },
        "summary" => Action::Summary {
            text: required(rest, command, "some text")?.to_string(),
        },
        "status" => Action::Status { json: false },
        other => return Err(format!("unknown command `{other}`, try `help`")),
    };
    Ok(ShellCommand::Run(action))
}

/// Runs the interactive shell until `/quit`, Ctrl+C, or Ctrl+D.
pub async fn run_shell(config: &RecollectConfig) -> Result<(), RecollectError> {
    let mut engine = actions::open_engine(config).await;

    let mut rl = DefaultEditor::new()
        .map_err(|e| RecollectError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "recollect shell".bold().green());
    println!(
        "{} entries loaded. Type {} for commands, {} to exit.\n",
        engine.memory().len(),
        "help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "recollect".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match parse_line(&line) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(ShellCommand::Help) => println!("{HELP}"),
                    Ok(ShellCommand::Run(action)) => {
                        println!("{}", actions::execute(&mut engine, action));
                    }
                    Err(message) => eprintln!("{}: {message}", "error".red()),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    engine.into_memory().close().await
}
