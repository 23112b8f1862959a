//! Transition validation against the tracker's live workflow.
//!
//! A candidate only becomes a suggestion if the item currently allows a
//! matching transition. Matching, first hit in tracker order wins:
//! 1. target status category id, when the candidate names one
//! 2. otherwise a case-insensitive substring match between the candidate's
//!    action label and the transition name or target status name
//!
//! When several transitions match, the first one returned by the tracker is
//! used; no further tie-break is attempted.

use crate::tracker::{Tracker, Transition};
use crate::types::Suggestion;

use super::intent::Candidate;

// Containment runs both ways, so a short name like "Block" also matches
// "flag as blocked"; the first such hit in tracker order is taken.
fn label_matches(label: &str, name: &str) -> bool {
    let name = name.trim().to_lowercase();
    !name.is_empty() && (name.contains(label) || label.contains(&name))
}

/// Pick the transition that executes `candidate`, if the item allows one.
pub fn match_transition<'a>(
    candidate: &Candidate,
    transitions: &'a [Transition],
) -> Option<&'a Transition> {
    match candidate.target {
        Some(category) => transitions
            .iter()
            .find(|t| t.target_status_category_id == Some(category.id())),
        None => {
            let label = candidate.action_label.trim().to_lowercase();
            if label.is_empty() {
                return None;
            }
            transitions.iter().find(|t| {
                label_matches(&label, &t.name) || label_matches(&label, &t.target_status_name)
            })
        }
    }
}

/// Resolve `candidate` for `item_id`. Tracker failures are logged and yield nothing.
pub async fn validate(
    tracker: &dyn Tracker,
    item_id: &str,
    candidate: &Candidate,
) -> Option<Suggestion> {
    let transitions = match tracker.list_transitions(item_id).await {
        Ok(t) => t,
        Err(e) => {
            log::warn!(
                "Validator: could not list transitions for {}: {}",
                item_id,
                e
            );
            return None;
        }
    };

    let Some(transition) = match_transition(candidate, &transitions) else {
        log::info!(
            "Validator: no allowed transition for '{}' on {}, discarding",
            candidate.action_label,
            item_id
        );
        return None;
    };

    let destination = if transition.target_status_name.is_empty() {
        &transition.name
    } else {
        &transition.target_status_name
    };
    Some(Suggestion::transition(
        item_id,
        format!("{} (→ {})", candidate.action_label, destination),
        candidate.reason.as_str(),
        &transition.id,
    ))
}
