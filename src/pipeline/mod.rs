//! Transcript intent pipeline.
//!
//! One submitted utterance runs four stages in order, each producing a
//! partial update that the orchestrator folds into `MeetingState`:
//!
//! extract → context_guard → intent → validator
//!
//! Suggestions produced by a run are appended to the shared
//! [`SuggestionQueue`] and returned to the caller. Nothing in a run is fatal:
//! the worst case is a run that produces no suggestions.

pub mod context_guard;
pub mod extract;
pub mod intent;
pub mod validator;

use std::sync::Arc;

use crate::queue::{ClaimError, SuggestionQueue};
use crate::state::{MeetingState, PhraseConfig, StateUpdate};
use crate::tracker::Tracker;
use crate::types::{Decision, ResolveOutcome, SubmitResult, Suggestion, SuggestionStatus};

use intent::{Candidate, IntentClassifier};

/// Working record for a single run. The candidate only lives between the
/// classifier and the validator.
struct Run<'a> {
    state: &'a mut MeetingState,
    utterance: &'a str,
    candidate: Option<Candidate>,
    produced: Vec<Suggestion>,
}

impl Run<'_> {
    fn apply(&mut self, update: StateUpdate) {
        self.state.apply(update);
    }
}

pub struct Pipeline {
    tracker: Arc<dyn Tracker>,
    queue: Arc<SuggestionQueue>,
    classifier: IntentClassifier,
}

impl Pipeline {
    pub fn new(tracker: Arc<dyn Tracker>, queue: Arc<SuggestionQueue>, phrases: &PhraseConfig) -> Self {
        Self {
            tracker,
            queue,
            classifier: IntentClassifier::new(phrases),
        }
    }

    pub fn queue(&self) -> &Arc<SuggestionQueue> {
        &self.queue
    }

    /// Run the full pipeline once for `utterance`.
    pub async fn submit_utterance(&self, state: &mut MeetingState, utterance: &str) -> SubmitResult {
        let mut run = Run {
            state,
            utterance,
            candidate: None,
            produced: Vec::new(),
        };
        run.apply(StateUpdate::append_transcript(utterance));

        // 1. Extractor
        let update = extract::extract(run.utterance);
        run.apply(update);

        // 2. Context guard
        let (update, diagnostic) =
            context_guard::guard(run.state.active_item_id(), run.state.active_project_key());
        run.apply(update);
        run.produced.extend(diagnostic);

        // 3. Intent classifier
        let outcome = self
            .classifier
            .classify(run.utterance, run.state.active_item_id());
        run.produced.extend(outcome.diagnostics);
        run.candidate = outcome.candidate;

        // 4. Validator
        if let (Some(candidate), Some(item_id)) =
            (run.candidate.take(), run.state.active_item_id())
        {
            if let Some(suggestion) =
                validator::validate(self.tracker.as_ref(), item_id, &candidate).await
            {
                run.produced.push(suggestion);
            }
        }

        let Run {
            state, produced, ..
        } = run;
        self.queue.extend(produced.iter().cloned());
        if !produced.is_empty() {
            log::info!("Pipeline: {} new suggestion(s)", produced.len());
        }

        SubmitResult {
            active_item_id: state.active_item_id().map(str::to_string),
            new_suggestions: produced,
        }
    }

    /// Apply a reviewer's decision. Only an accepted, executable suggestion
    /// reaches the tracker, and only once. Dropping the returned future while
    /// the tracker call is pending leaves the suggestion pending.
    pub async fn resolve_suggestion(&self, id: &str, decision: Decision) -> ResolveOutcome {
        match decision {
            Decision::Reject => match self.queue.reject(id) {
                Ok(()) => {
                    log::info!("Suggestion {} rejected", id);
                    ResolveOutcome::resolved(SuggestionStatus::Rejected, false)
                }
                Err(e) => self.refused(id, decision, e),
            },
            Decision::Accept => {
                let claim = match self.queue.claim(id) {
                    Ok(c) => c,
                    Err(e) => return self.refused(id, decision, e),
                };

                let applied = self
                    .tracker
                    .apply_transition(&claim.item_id, &claim.transition_id)
                    .await;
                match applied {
                    Ok(()) => {
                        log::info!(
                            "Applied transition {} to {}",
                            claim.transition_id,
                            claim.item_id
                        );
                        claim.complete();
                        ResolveOutcome::resolved(SuggestionStatus::Accepted, true)
                    }
                    Err(e) => {
                        log::warn!(
                            "Failed to apply transition {} to {}: {}",
                            claim.transition_id,
                            claim.item_id,
                            e
                        );
                        claim.release();
                        ResolveOutcome::failed(
                            Some(SuggestionStatus::Pending),
                            format!("{}. {}", e, e.recovery_suggestion()),
                        )
                    }
                }
            }
        }
    }

    fn refused(&self, id: &str, decision: Decision, err: ClaimError) -> ResolveOutcome {
        match err {
            ClaimError::AlreadyResolved(status) => ResolveOutcome::unchanged(status, decision),
            ClaimError::NotFound(_) => ResolveOutcome::failed(None, err.to_string()),
            _ => ResolveOutcome::failed(
                self.queue.get(id).map(|s| s.status),
                err.to_string(),
            ),
        }
    }
}
