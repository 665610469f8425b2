// SPDX-FileCopyrightText: 2026 Recollect Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The running summary slot.

use recollect_memory::vectorize;

/// A single digest of the current session, overwritten wholesale.
///
/// Lives as long as the engine that owns it and is never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    text: String,
    vector: Vec<f64>,
}

impl Summary {
    /// Replaces the summary with the trimmed `text`.
    ///
    /// Blank input leaves the current summary untouched and returns false.
    pub fn record(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.vector = vectorize(text);
        self.text = text.to_string();
        true
    }

    /// The summary text, if one has been recorded.
    pub fn text(&self) -> Option<&str> {
        (!self.text.is_empty()).then_some(self.text.as_str())
    }

    pub fn vector(&self) -> &[f64] {
        &self.vector
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let summary = Summary::default();
        assert!(summary.is_empty());
        assert_eq!(summary.text(), None);
        assert!(summary.vector().is_empty());
    }

    #[test]
    fn record_trims_and_vectorizes() {
        let mut summary = Summary::default();
        assert!(summary.record("  user is writing a report \n"));
        assert_eq!(summary.text(), Some("user is writing a report"));
        assert_eq!(summary.vector(), vectorize("user is writing a report").as_slice());
    }

    #[test]
    fn blank_input_keeps_previous_summary() {
        let mut summary = Summary::default();
        summary.record("first");
        assert!(!summary.record("   "));
        assert_eq!(summary.text(), Some("first"));
    }

    #[test]
    fn last_write_wins() {
        let mut summary = Summary::default();
        summary.record("first");
        summary.record("second");
        assert_eq!(summary.text(), Some("second"));
        assert_eq!(summary.vector(), vectorize("second").as_slice());
    }
}
