//! Meeting transcript → issue tracker suggestions, with a human in the loop.
//!
//! The [`pipeline::Pipeline`] turns each utterance into zero or more
//! [`types::Suggestion`]s validated against the tracker's live workflow;
//! reviewers accept or reject them through `resolve_suggestion`.

pub mod artifacts;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod session;
pub mod state;
pub mod tracker;
pub mod types;
