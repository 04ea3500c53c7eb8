//! Display labels for catalog stats.
//!
//! Labels come from configuration and are checked against the stat catalog
//! once, at startup: a label for a stat the catalog does not know, or a
//! catalog stat without a label, is a configuration error.

use std::collections::BTreeMap;

use duelbot_core::error::DomainError;

use super::model::StatType;

/// Validated mapping from stat name to display label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatLabels {
    labels: BTreeMap<String, String>,
}

impl StatLabels {
    /// Validates `labels` against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` naming every unknown label and
    /// every unlabeled stat.
    pub fn validate(
        labels: BTreeMap<String, String>,
        catalog: &[StatType],
    ) -> Result<Self, DomainError> {
        let unknown: Vec<&str> = labels
            .keys()
            .filter(|name| !catalog.iter().any(|stat| &stat.name == *name))
            .map(String::as_str)
            .collect();
        let unlabeled: Vec<&str> = catalog
            .iter()
            .filter(|stat| !labels.contains_key(&stat.name))
            .map(|stat| stat.name.as_str())
            .collect();

        if unknown.is_empty() && unlabeled.is_empty() {
            return Ok(Self { labels });
        }

        let mut problems = Vec::new();
        if !unknown.is_empty() {
            problems.push(format!("labels for unknown stats: {}", unknown.join(", ")));
        }
        if !unlabeled.is_empty() {
            problems.push(format!("stats without labels: {}", unlabeled.join(", ")));
        }
        Err(DomainError::Configuration(problems.join("; ")))
    }

    /// Parses a JSON object of `name -> label` and validates it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` on malformed JSON or a mapping
    /// that does not match the catalog.
    pub fn from_json(json: &str, catalog: &[StatType]) -> Result<Self, DomainError> {
        let labels: BTreeMap<String, String> = serde_json::from_str(json)
            .map_err(|e| DomainError::Configuration(format!("invalid stat labels: {e}")))?;
        Self::validate(labels, catalog)
    }

    /// Display label for `name`, if the catalog knew it at load time.
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }
}
