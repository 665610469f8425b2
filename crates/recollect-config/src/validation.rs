// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde cannot express: positive bounds,
//! fractions inside [0, 1], and a usable store path.

use crate::diagnostic::ConfigError;
use crate::model::RecollectConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &RecollectConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let memory = &config.memory;

    if memory.max_entries == 0 {
        errors.push(ConfigError::validation(
            "memory.max_entries",
            "must be at least 1",
        ));
    }

    if memory.max_entry_age_days == 0 {
        errors.push(ConfigError::validation(
            "memory.max_entry_age_days",
            "must be at least 1",
        ));
    }

    if memory.recent_max_count == 0 {
        errors.push(ConfigError::validation(
            "memory.recent_max_count",
            "must be at least 1",
        ));
    }

    if !(memory.recency_half_life_secs > 0.0 && memory.recency_half_life_secs.is_finite()) {
        errors.push(ConfigError::validation(
            "memory.recency_half_life_secs",
            format!(
                "must be a positive number of seconds, got {}",
                memory.recency_half_life_secs
            ),
        ));
    }

    let fractions = [
        ("memory.similarity_threshold", memory.similarity_threshold),
        ("memory.weighted_threshold", memory.weighted_threshold),
        ("memory.similarity_weight", memory.similarity_weight),
        ("memory.recency_weight", memory.recency_weight),
        ("memory.frequency_weight", memory.frequency_weight),
        ("memory.recency_bonus", memory.recency_bonus),
        ("memory.score_cap", memory.score_cap),
        ("memory.tie_window", memory.tie_window),
    ];
    for (key, value) in fractions {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::validation(
                key,
                format!("must be within 0.0..=1.0, got {value}"),
            ));
        }
    }

    let weight_sum = memory.similarity_weight + memory.recency_weight + memory.frequency_weight;
    if weight_sum > 1.0 + f64::EPSILON {
        tracing::warn!(
            weight_sum,
            "weighted score coefficients sum above 1.0; scores may exceed 1.0"
        );
    }

    if config.storage.store_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.store_path",
            "must not be empty",
        ));
    }

    if config.context.max_chars == 0 {
        errors.push(ConfigError::validation(
            "context.max_chars",
            "must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error_for(errors: &[ConfigError], wanted: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { key, .. } if key == wanted))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&RecollectConfig::default()).is_ok());
    }

    #[test]
    fn zero_max_entries_fails_validation() {
        let mut config = RecollectConfig::default();
        config.memory.max_entries = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "memory.max_entries"));
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let mut config = RecollectConfig::default();
        config.memory.similarity_threshold = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "memory.similarity_threshold"));
    }

    #[test]
    fn non_positive_half_life_fails_validation() {
        let mut config = RecollectConfig::default();
        config.memory.recency_half_life_secs = 0.0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error_for(&errors, "memory.recency_half_life_secs"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = RecollectConfig::default();
        config.memory.max_entries = 0;
        config.memory.recent_max_count = 0;
        config.storage.store_path = "  ".to_string();
        config.context.max_chars = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(has_error_for(&errors, "storage.store_path"));
        assert!(has_error_for(&errors, "context.max_chars"));
    }
}
