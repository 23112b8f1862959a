//! Context guard: keeps foreign item keys out of focus.
//!
//! An item belongs to the active project iff the letters before its hyphen
//! equal the project key exactly. No tracker lookup is made, so valid
//! cross-project links are also rejected.

use crate::state::StateUpdate;
use crate::types::Suggestion;

pub const UNRECOGNIZED_REFERENCE: &str = "Unrecognized reference";

/// Project prefix of an item key (`"ALPHA-12"` → `"ALPHA"`).
pub fn item_prefix(item_id: &str) -> &str {
    item_id.split('-').next().unwrap_or("")
}

pub fn belongs_to_project(item_id: &str, project_key: &str) -> bool {
    item_prefix(item_id) == project_key
}

/// Confirm or clear the candidate item. A cleared item yields one diagnostic.
pub fn guard(candidate: Option<&str>, project_key: &str) -> (StateUpdate, Option<Suggestion>) {
    let Some(item_id) = candidate.filter(|id| !id.is_empty()) else {
        return (StateUpdate::none(), None);
    };

    if belongs_to_project(item_id, project_key) {
        return (StateUpdate::none(), None);
    }

    log::info!(
        "Context guard: {} is outside project {}, clearing focus",
        item_id,
        project_key
    );
    let diagnostic = Suggestion::diagnostic(
        item_id,
        UNRECOGNIZED_REFERENCE,
        format!(
            "{} does not belong to the active project {}",
            item_id, project_key
        ),
    );
    (StateUpdate::clear_focus(), Some(diagnostic))
}
