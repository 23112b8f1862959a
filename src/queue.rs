//! Suggestion queue shared by all pipeline runs.
//!
//! Append-only: suggestions are never removed, only relabeled. Each entry
//! guards its own status, so a status change is a compare-and-set on that
//! entry alone. Accepting is split into claim → tracker call → complete or release;
//! while a claim is held no other decision can touch the entry, which keeps a
//! duplicate accept from calling the tracker twice.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use crate::types::{Suggestion, SuggestionStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("Suggestion not found: {0}")]
    NotFound(String),
    #[error("Suggestion is already {}", .0.label())]
    AlreadyResolved(SuggestionStatus),
    #[error("Suggestion has no tracker transition and can only be dismissed")]
    NotExecutable,
    #[error("Suggestion is already being applied")]
    InFlight,
}

/// Exclusive right to apply one pending suggestion.
///
/// Dropping the claim without calling [`ApplyClaim::complete`] hands the
/// suggestion back as pending, including when the future awaiting the
/// tracker call is cancelled.
pub struct ApplyClaim {
    pub id: String,
    pub item_id: String,
    pub transition_id: String,
    entry: Arc<Entry>,
    completed: bool,
}

impl ApplyClaim {
    /// The tracker accepted the transition: mark the suggestion accepted.
    pub fn complete(mut self) {
        let mut state = self.entry.state.lock();
        state.applying = false;
        state.suggestion.status = SuggestionStatus::Accepted;
        state.suggestion.resolved_at = Some(Utc::now());
        drop(state);
        self.completed = true;
    }

    /// The tracker call failed: the suggestion stays pending.
    pub fn release(self) {}
}

impl Drop for ApplyClaim {
    fn drop(&mut self) {
        if !self.completed {
            self.entry.state.lock().applying = false;
        }
    }
}

impl std::fmt::Debug for ApplyClaim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplyClaim")
            .field("id", &self.id)
            .field("item_id", &self.item_id)
            .field("transition_id", &self.transition_id)
            .finish()
    }
}

struct EntryState {
    suggestion: Suggestion,
    applying: bool,
}

struct Entry {
    state: Mutex<EntryState>,
}

impl Entry {
    fn snapshot(&self) -> Suggestion {
        self.state.lock().suggestion.clone()
    }
}

#[derive(Default)]
pub struct SuggestionQueue {
    order: RwLock<Vec<Arc<Entry>>>,
    index: DashMap<String, Arc<Entry>>,
}

impl SuggestionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, suggestion: Suggestion) {
        let id = suggestion.id.clone();
        let entry = Arc::new(Entry {
            state: Mutex::new(EntryState {
                suggestion,
                applying: false,
            }),
        });
        let mut order = self.order.write();
        self.index.insert(id, entry.clone());
        order.push(entry);
    }

    pub fn extend(&self, suggestions: impl IntoIterator<Item = Suggestion>) {
        for s in suggestions {
            self.push(s);
        }
    }

    pub fn len(&self) -> usize {
        self.order.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Suggestion> {
        self.index.get(id).map(|e| e.snapshot())
    }

    /// Every suggestion ever queued, in creation order.
    pub fn snapshot(&self) -> Vec<Suggestion> {
        self.order.read().iter().map(|e| e.snapshot()).collect()
    }

    pub fn pending(&self) -> Vec<Suggestion> {
        self.snapshot()
            .into_iter()
            .filter(|s| s.status == SuggestionStatus::Pending)
            .collect()
    }

    fn entry(&self, id: &str) -> Result<Arc<Entry>, ClaimError> {
        self.index
            .get(id)
            .map(|e| e.value().clone())
            .ok_or_else(|| ClaimError::NotFound(id.to_string()))
    }

    /// Claim a pending, executable suggestion for applying.
    pub fn claim(&self, id: &str) -> Result<ApplyClaim, ClaimError> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock();
        if state.suggestion.status.is_terminal() {
            return Err(ClaimError::AlreadyResolved(state.suggestion.status));
        }
        if state.applying {
            return Err(ClaimError::InFlight);
        }
        if !state.suggestion.is_executable() {
            return Err(ClaimError::NotExecutable);
        }
        let transition_id = state.suggestion.transition_id.clone().unwrap_or_default();

        state.applying = true;
        let item_id = state.suggestion.item_id.clone();
        drop(state);
        Ok(ApplyClaim {
            id: id.to_string(),
            item_id,
            transition_id,
            entry,
            completed: false,
        })
    }

    /// Reject (or dismiss) a pending suggestion.
    pub fn reject(&self, id: &str) -> Result<(), ClaimError> {
        let entry = self.entry(id)?;
        let mut state = entry.state.lock();
        if state.suggestion.status.is_terminal() {
            return Err(ClaimError::AlreadyResolved(state.suggestion.status));
        }
        if state.applying {
            return Err(ClaimError::InFlight);
        }
        state.suggestion.status = SuggestionStatus::Rejected;
        state.suggestion.resolved_at = Some(Utc::now());
        Ok(())
    }
}
