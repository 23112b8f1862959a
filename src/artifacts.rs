//! End-of-meeting artifacts built from the transcript and review decisions.

use serde::Serialize;

use crate::types::{Suggestion, SuggestionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "At Risk")]
    AtRisk,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveDigest {
    pub sentiment: Sentiment,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingArtifacts {
    pub summary: String,
    pub action_items: Vec<String>,
    pub decisions: Vec<String>,
    pub executive_digest: ExecutiveDigest,
}

pub fn generate_artifacts(transcript_history: &[String], suggestions: &[Suggestion]) -> MeetingArtifacts {
    let accepted: Vec<&Suggestion> = suggestions
        .iter()
        .filter(|s| s.status == SuggestionStatus::Accepted)
        .collect();
    let rejected = suggestions
        .iter()
        .filter(|s| s.status == SuggestionStatus::Rejected)
        .count();

    let summary = format!(
        "## Meeting Summary\nThe team discussed {} items.\n- {} updates were approved.\n- {} suggestions were dismissed.",
        transcript_history.len(),
        accepted.len(),
        rejected
    );

    let action_items = accepted
        .iter()
        .map(|s| format!("Update {}: {}", s.item_id, s.action_label))
        .collect();

    let (sentiment, reason) = if accepted.len() > rejected {
        (
            Sentiment::OnTrack,
            "Team is actively updating tickets and progressing.",
        )
    } else {
        (
            Sentiment::AtRisk,
            "Multiple suggestions were rejected or discussion stalled.",
        )
    };

    MeetingArtifacts {
        summary,
        action_items,
        decisions: vec![
            "Sprint goals reviewed.".to_string(),
            format!("Committed to {} tracker updates.", accepted.len()),
        ],
        executive_digest: ExecutiveDigest {
            sentiment,
            reason: reason.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NO_ITEM;

    fn with_status(mut s: Suggestion, status: SuggestionStatus) -> Suggestion {
        s.status = status;
        s
    }

    #[test]
    fn test_on_track_when_mostly_accepted() {
        let history = vec!["ALPHA-1 done".to_string(), "ALPHA-2 started".to_string()];
        let suggestions = vec![
            with_status(
                Suggestion::transition("ALPHA-1", "Move to Done (→ Done)", "done", "31"),
                SuggestionStatus::Accepted,
            ),
            Suggestion::transition("ALPHA-2", "Move to In Progress (→ In Progress)", "start", "11"),
        ];

        let artifacts = generate_artifacts(&history, &suggestions);
        assert!(artifacts.summary.contains("discussed 2 items"));
        assert!(artifacts.summary.contains("1 updates were approved"));
        assert_eq!(
            artifacts.action_items,
            vec!["Update ALPHA-1: Move to Done (→ Done)".to_string()]
        );
        assert_eq!(artifacts.decisions[1], "Committed to 1 tracker updates.");
        assert_eq!(artifacts.executive_digest.sentiment, Sentiment::OnTrack);
    }

    #[test]
    fn test_at_risk_on_ties_and_empty_meetings() {
        let empty = generate_artifacts(&[], &[]);
        assert_eq!(empty.executive_digest.sentiment, Sentiment::AtRisk);
        assert!(empty.action_items.is_empty());

        let suggestions = vec![
            with_status(
                Suggestion::transition("ALPHA-1", "Move to Done", "done", "31"),
                SuggestionStatus::Accepted,
            ),
            with_status(
                Suggestion::diagnostic(NO_ITEM, "Off-topic discussion", "weekend"),
                SuggestionStatus::Rejected,
            ),
        ];
        let tied = generate_artifacts(&["x".to_string()], &suggestions);
        assert_eq!(tied.executive_digest.sentiment, Sentiment::AtRisk);
    }

    #[test]
    fn test_sentiment_serializes_with_spaces() {
        let json = serde_json::to_value(generate_artifacts(&[], &[])).unwrap();
        assert_eq!(json["executiveDigest"]["sentiment"], "At Risk");
        assert!(json["actionItems"].is_array());
    }
}
