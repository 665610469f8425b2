// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./recollect.toml` > `~/.config/recollect/recollect.toml`
//! > `/etc/recollect/recollect.toml` with environment variable overrides via
//! the `RECOLLECT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RecollectConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG: &str = "/etc/recollect/recollect.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG: &str = "recollect.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("recollect").join("recollect.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/recollect/recollect.toml`
/// 3. `~/.config/recollect/recollect.toml`
/// 4. `./recollect.toml`
/// 5. `RECOLLECT_*` environment variables
pub fn load_config() -> Result<RecollectConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RecollectConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecollectConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RecollectConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RecollectConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RecollectConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `RECOLLECT_MEMORY_MAX_ENTRIES`
/// must become `memory.max_entries`, not `memory.max.entries`.
fn env_provider() -> Env {
    Env::prefixed("RECOLLECT_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Map a lowercased, prefix-stripped env var name onto a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ["memory", "storage", "context", "logging"] {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
