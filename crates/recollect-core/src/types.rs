// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Recollect crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier of a stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        EntryId(value)
    }
}

/// The inference backend an assembled context block is destined for.
///
/// Each variant carries its own display metadata so consumers never need
/// to inspect a concrete provider type to label it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Backend {
    /// A local Ollama daemon.
    #[default]
    Ollama,
    /// A local llama.cpp server.
    LlamaCpp,
    /// Any hosted endpoint speaking the OpenAI chat-completions dialect.
    OpenAiCompatible,
}

impl Backend {
    /// Human-readable name for headers and status output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Ollama => "Ollama",
            Backend::LlamaCpp => "llama.cpp",
            Backend::OpenAiCompatible => "OpenAI-compatible API",
        }
    }

    /// Whether inference runs on this machine.
    pub fn is_local(&self) -> bool {
        matches!(self, Backend::Ollama | Backend::LlamaCpp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn backend_parses_from_snake_case() {
        for backend in [Backend::Ollama, Backend::LlamaCpp, Backend::OpenAiCompatible] {
            let s = backend.to_string();
            assert_eq!(Backend::from_str(&s).unwrap(), backend);
        }
        assert_eq!(Backend::from_str("llama_cpp").unwrap(), Backend::LlamaCpp);
    }

    #[test]
    fn backend_serde_matches_strum() {
        let json = serde_json::to_string(&Backend::OpenAiCompatible).unwrap();
        assert_eq!(json, "\"open_ai_compatible\"");
        assert_eq!(
            Backend::OpenAiCompatible.to_string(),
            "open_ai_compatible"
        );
    }

    #[test]
    fn backend_display_metadata() {
        assert_eq!(Backend::Ollama.display_name(), "Ollama");
        assert!(Backend::LlamaCpp.is_local());
        assert!(!Backend::OpenAiCompatible.is_local());
    }

    #[test]
    fn entry_id_is_transparent_in_json() {
        let id = EntryId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        assert_eq!(id.to_string(), "abc");
    }
}
