use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel `item_id` for meeting-level diagnostics that target no work item.
pub const NO_ITEM: &str = "no-item";

/// Tracker status categories (Jira's built-in category ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusCategory {
    ToDo,
    InProgress,
    Done,
}

impl StatusCategory {
    /// Numeric id as reported by the tracker (`statusCategory.id`).
    pub fn id(self) -> u32 {
        match self {
            Self::ToDo => 2,
            Self::Done => 3,
            Self::InProgress => 4,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            2 => Some(Self::ToDo),
            3 => Some(Self::Done),
            4 => Some(Self::InProgress),
            _ => None,
        }
    }
}

/// Review state of a suggestion. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

/// A proposed change (or a diagnostic) awaiting human review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    /// Target work item key, or [`NO_ITEM`] for meeting-level diagnostics.
    pub item_id: String,
    pub action_label: String,
    pub reason: String,
    /// Only set for suggestions backed by a validated tracker transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_id: Option<String>,
    pub status: SuggestionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Suggestion {
    /// An executable suggestion bound to a tracker transition.
    pub fn transition(
        item_id: &str,
        action_label: impl Into<String>,
        reason: impl Into<String>,
        transition_id: &str,
    ) -> Self {
        Self::new(item_id, action_label.into(), reason.into(), Some(transition_id.to_string()))
    }

    /// A non-executable diagnostic. It can only ever be dismissed.
    pub fn diagnostic(
        item_id: &str,
        action_label: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(item_id, action_label.into(), reason.into(), None)
    }

    fn new(
        item_id: &str,
        action_label: String,
        reason: String,
        transition_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            action_label,
            reason,
            transition_id,
            status: SuggestionStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn is_executable(&self) -> bool {
        self.transition_id.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_meeting_level(&self) -> bool {
        self.item_id == NO_ITEM
    }
}

/// A reviewer's decision on a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    fn target(self) -> SuggestionStatus {
        match self {
            Self::Accept => SuggestionStatus::Accepted,
            Self::Reject => SuggestionStatus::Rejected,
        }
    }
}

/// Result of `submit_utterance`: the item now in focus and what this run produced.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub active_item_id: Option<String>,
    pub new_suggestions: Vec<Suggestion>,
}

/// Result of `resolve_suggestion`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOutcome {
    pub ok: bool,
    /// True only when this call applied a tracker transition.
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SuggestionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResolveOutcome {
    pub fn resolved(status: SuggestionStatus, applied: bool) -> Self {
        Self {
            ok: true,
            applied,
            status: Some(status),
            error: None,
        }
    }

    pub fn failed(status: Option<SuggestionStatus>, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            applied: false,
            status,
            error: Some(error.into()),
        }
    }

    /// Outcome for a decision repeated on an already-terminal suggestion.
    pub fn unchanged(current: SuggestionStatus, decision: Decision) -> Self {
        if current == decision.target() {
            Self::resolved(current, false)
        } else {
            Self::failed(
                Some(current),
                format!("Suggestion is already {}", current.label()),
            )
        }
    }
}
