//! Issue tracker seam.
//!
//! The pipeline only needs two calls from the tracker: the live list of
//! transitions an item allows, and applying one of them. `jira` implements
//! both against Jira Cloud's REST API.

pub mod jira;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// One workflow transition currently available for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,
    /// The transition's own name, e.g. "Close Issue".
    pub name: String,
    /// Name of the destination status, e.g. "Closed".
    pub target_status_name: String,
    pub target_status_category_id: Option<u32>,
}

#[async_trait]
pub trait Tracker: Send + Sync {
    /// Transitions allowed for `item_id`, in tracker order.
    async fn list_transitions(&self, item_id: &str) -> Result<Vec<Transition>, TrackerError>;

    async fn apply_transition(&self, item_id: &str, transition_id: &str)
        -> Result<(), TrackerError>;
}

/// Stand-in used when no tracker credentials are configured. Every call
/// fails soft, so the pipeline still runs and reports why nothing applies.
pub struct Unconfigured {
    reason: String,
}

impl Unconfigured {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Tracker for Unconfigured {
    async fn list_transitions(&self, _item_id: &str) -> Result<Vec<Transition>, TrackerError> {
        Err(TrackerError::NotConfigured(self.reason.clone()))
    }

    async fn apply_transition(
        &self,
        _item_id: &str,
        _transition_id: &str,
    ) -> Result<(), TrackerError> {
        Err(TrackerError::NotConfigured(self.reason.clone()))
    }
}


/// Scripted tracker for tests: fixed transitions per item, counted apply calls.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct FakeTracker {
        transitions: HashMap<String, Vec<Transition>>,
        fail_list: bool,
        fail_apply: Mutex<bool>,
        apply_delay: Option<Duration>,
        pub list_calls: AtomicUsize,
        pub applied: Mutex<Vec<(String, String)>>,
    }

    pub fn transition(id: &str, name: &str, target: &str, category: Option<u32>) -> Transition {
        Transition {
            id: id.to_string(),
            name: name.to_string(),
            target_status_name: target.to_string(),
            target_status_category_id: category,
        }
    }

    impl FakeTracker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_transitions(mut self, item_id: &str, transitions: Vec<Transition>) -> Self {
            self.transitions.insert(item_id.to_string(), transitions);
            self
        }

        pub fn failing_list(mut self) -> Self {
            self.fail_list = true;
            self
        }

        pub fn failing_apply(self) -> Self {
            *self.fail_apply.lock() = true;
            self
        }

        pub fn with_apply_delay(mut self, delay: Duration) -> Self {
            self.apply_delay = Some(delay);
            self
        }

        pub fn set_apply_failing(&self, failing: bool) {
            *self.fail_apply.lock() = failing;
        }

        pub fn apply_count(&self) -> usize {
            self.applied.lock().len()
        }

        pub fn list_count(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Tracker for FakeTracker {
        async fn list_transitions(&self, item_id: &str) -> Result<Vec<Transition>, TrackerError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list {
                return Err(TrackerError::Network("connection refused".to_string()));
            }
            Ok(self.transitions.get(item_id).cloned().unwrap_or_default())
        }

        async fn apply_transition(
            &self,
            item_id: &str,
            transition_id: &str,
        ) -> Result<(), TrackerError> {
            if let Some(delay) = self.apply_delay {
                tokio::time::sleep(delay).await;
            }
            if *self.fail_apply.lock() {
                return Err(TrackerError::Api {
                    status: 400,
                    body: "Transition is not valid".to_string(),
                });
            }
            self.applied
                .lock()
                .push((item_id.to_string(), transition_id.to_string()));
            Ok(())
        }
    }
}
