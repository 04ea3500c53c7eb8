//! Duel flavor-text catalog.

use duelbot_core::error::DomainError;
use serde::Deserialize;
use tracing::warn;

/// Placeholder for the challenge issuer in announce text.
pub const INITIATOR_PLACEHOLDER: &str = "{initiator}";
/// Placeholder for the accepting user in announce text.
pub const CHALLENGER_PLACEHOLDER: &str = "{challenger}";
/// Placeholder for the winner in win duel text.
pub const WINNER_PLACEHOLDER: &str = "{winner}";

/// One announce + duel text pair.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DuelTemplate {
    /// Posted first; may name both participants.
    pub announce: String,
    /// Posted second; win templates name the winner, draw templates name nobody.
    #[serde(rename = "duel")]
    pub narration: String,
    /// Which bucket the template belongs to.
    #[serde(default)]
    pub is_draw: bool,
}

impl DuelTemplate {
    /// Announce text with both participants filled in.
    #[must_use]
    pub fn announce_for(&self, initiator: &str, challenger: &str) -> String {
        self.announce
            .replace(INITIATOR_PLACEHOLDER, initiator)
            .replace(CHALLENGER_PLACEHOLDER, challenger)
    }

    /// Duel text; `winner` is substituted only into win templates.
    #[must_use]
    pub fn narration_for(&self, winner: Option<&str>) -> String {
        match winner {
            Some(name) if !self.is_draw => self.narration.replace(WINNER_PLACEHOLDER, name),
            _ => self.narration.clone(),
        }
    }
}

/// Templates split into the draw and win buckets.
#[derive(Debug, Clone, Default)]
pub struct DuelTemplates {
    draws: Vec<DuelTemplate>,
    wins: Vec<DuelTemplate>,
}

impl DuelTemplates {
    /// Splits `templates` by their `is_draw` tag. An empty bucket is
    /// allowed here and only fails when a duel needs it.
    #[must_use]
    pub fn new(templates: Vec<DuelTemplate>) -> Self {
        let (draws, wins): (Vec<_>, Vec<_>) = templates.into_iter().partition(|t| t.is_draw);
        if draws.is_empty() {
            warn!("duel template catalog has no draw templates");
        }
        if wins.is_empty() {
            warn!("duel template catalog has no win templates");
        }
        Self { draws, wins }
    }

    /// Parses a JSON array of templates.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Configuration` on malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        let templates: Vec<DuelTemplate> = serde_json::from_str(json)
            .map_err(|e| DomainError::Configuration(format!("invalid duel templates: {e}")))?;
        Ok(Self::new(templates))
    }

    /// The bucket for a draw (`true`) or a decisive duel (`false`).
    #[must_use]
    pub fn bucket(&self, draw: bool) -> &[DuelTemplate] {
        if draw { &self.draws } else { &self.wins }
    }

    /// Total number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.len() + self.wins.len()
    }

    /// Returns `true` if no templates were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        {"announce": "{initiator} bows to {challenger}.", "duel": "{winner} wins the bout!", "is_draw": false},
        {"announce": "Swords cross!", "duel": "Nobody yields.", "is_draw": true},
        {"announce": "A glove hits the floor.", "duel": "{winner} stands alone."}
    ]"#;

    #[test]
    fn test_from_json_partitions_by_draw_tag_defaulting_to_win() {
        let templates = DuelTemplates::from_json(CATALOG).unwrap();
        assert_eq!(templates.bucket(true).len(), 1);
        assert_eq!(templates.bucket(false).len(), 2);
        assert_eq!(templates.len(), 3);
    }

    #[test]
    fn test_announce_fills_both_names() {
        let templates = DuelTemplates::from_json(CATALOG).unwrap();
        let text = templates.bucket(false)[0].announce_for("alice", "bob");
        assert_eq!(text, "alice bows to bob.");
    }

    #[test]
    fn test_draw_narration_ignores_winner() {
        let template = DuelTemplate {
            announce: String::new(),
            narration: "{winner} and nobody".to_owned(),
            is_draw: true,
        };
        assert_eq!(template.narration_for(Some("alice")), "{winner} and nobody");
    }

    #[test]
    fn test_win_narration_names_winner() {
        let templates = DuelTemplates::from_json(CATALOG).unwrap();
        assert_eq!(
            templates.bucket(false)[1].narration_for(Some("bob")),
            "bob stands alone."
        );
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        assert!(matches!(
            DuelTemplates::from_json("{\"announce\": 1}"),
            Err(DomainError::Configuration(_))
        ));
    }
}
