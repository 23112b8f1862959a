//! Keyword-based intent classification for a single utterance.
//!
//! Produces at most one per-item candidate (first matching rule wins:
//! completion, then start of work, then blocked) plus meeting-level
//! diagnostics that do not depend on any ticket. No I/O, cannot fail.

use chrono::Utc;

use crate::state::PhraseConfig;
use crate::types::{StatusCategory, Suggestion, SuggestionStatus, NO_ITEM};

pub const TIME_CHECK: &str = "Time check";
pub const OFF_TOPIC: &str = "Off-topic discussion";

/// Proposed target for the item in focus, consumed only by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Category to move into, or `None` for label-matched intents like "Flag as Blocked".
    pub target: Option<StatusCategory>,
    pub action_label: String,
    pub reason: String,
}

impl Candidate {
    fn new(target: Option<StatusCategory>, action_label: &str, reason: &str) -> Self {
        Self {
            target,
            action_label: action_label.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct IntentOutcome {
    pub candidate: Option<Candidate>,
    pub diagnostics: Vec<Suggestion>,
}

pub struct IntentClassifier {
    phrases: PhraseConfig,
}

fn lowercase_all(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

/// First phrase from `list` contained in `text`.
fn first_match<'a>(text: &str, list: &'a [String]) -> Option<&'a str> {
    list.iter().find(|p| text.contains(p.as_str())).map(|p| p.as_str())
}

impl IntentClassifier {
    pub fn new(phrases: &PhraseConfig) -> Self {
        Self {
            phrases: PhraseConfig {
                completion: lowercase_all(&phrases.completion),
                started: lowercase_all(&phrases.started),
                blocked: lowercase_all(&phrases.blocked),
                pacing: lowercase_all(&phrases.pacing),
                off_topic: lowercase_all(&phrases.off_topic),
            },
        }
    }

    pub fn classify(&self, utterance: &str, active_item_id: Option<&str>) -> IntentOutcome {
        let text = utterance.to_lowercase();
        let in_focus = active_item_id.is_some_and(|id| !id.is_empty());
        let mut outcome = IntentOutcome::default();

        // Small talk with nothing in focus: record it as dismissed and stop.
        if !in_focus {
            if let Some(phrase) = first_match(&text, &self.phrases.off_topic) {
                log::debug!("Intent: off-topic phrase '{}' with no item in focus", phrase);
                let mut flagged = Suggestion::diagnostic(
                    NO_ITEM,
                    OFF_TOPIC,
                    format!("Off-topic discussion detected ('{}')", phrase),
                );
                flagged.status = SuggestionStatus::Rejected;
                flagged.resolved_at = Some(Utc::now());
                outcome.diagnostics.push(flagged);
                return outcome;
            }
        }

        if let Some(phrase) = first_match(&text, &self.phrases.pacing) {
            outcome.diagnostics.push(Suggestion::diagnostic(
                NO_ITEM,
                TIME_CHECK,
                format!("Meeting pacing: '{}' mentioned", phrase),
            ));
        }

        if in_focus {
            outcome.candidate = self.item_candidate(&text);
            if let Some(ref c) = outcome.candidate {
                log::debug!("Intent: candidate '{}'", c.action_label);
            }
        }

        outcome
    }

    fn item_candidate(&self, text: &str) -> Option<Candidate> {
        if first_match(text, &self.phrases.completion).is_some() {
            return Some(Candidate::new(
                Some(StatusCategory::Done),
                "Move to Done",
                "User indicated completion",
            ));
        }
        if first_match(text, &self.phrases.started).is_some() {
            return Some(Candidate::new(
                Some(StatusCategory::InProgress),
                "Move to In Progress",
                "User started work",
            ));
        }
        if first_match(text, &self.phrases.blocked).is_some() {
            return Some(Candidate::new(
                None,
                "Flag as Blocked",
                "User mentioned being blocked",
            ));
        }
        None
    }
}
