//! Line-oriented meeting session driven by the `ceremony` binary.
//!
//! Commands:
//! - `/accept <id>`            apply a suggestion's transition
//! - `/reject <id>`, `/dismiss <id>`
//! - `/queue`                  list pending suggestions
//! - `/summary`                meeting artifacts
//! - anything else             an utterance for the pipeline

use serde::Serialize;

use crate::artifacts::{generate_artifacts, MeetingArtifacts};
use crate::pipeline::context_guard::belongs_to_project;
use crate::pipeline::extract::find_item_key;
use crate::pipeline::Pipeline;
use crate::state::MeetingState;
use crate::types::{Decision, ResolveOutcome, SubmitResult, Suggestion};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Utterance(String),
    Resolve { id: String, decision: Decision },
    Queue,
    Summary,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if !line.starts_with('/') {
        return Ok(Some(Command::Utterance(line.to_string())));
    }

    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    let arg = parts.next();

    let decision = match verb {
        "/queue" => return Ok(Some(Command::Queue)),
        "/summary" => return Ok(Some(Command::Summary)),
        "/accept" => Decision::Accept,
        "/reject" | "/dismiss" => Decision::Reject,
        other => return Err(format!("Unknown command: {}", other)),
    };
    let id = arg.ok_or_else(|| format!("Usage: {} <suggestion-id>", verb))?;
    Ok(Some(Command::Resolve {
        id: id.to_string(),
        decision,
    }))
}

/// Opening state for a session, optionally focused on `item`. The item must
/// be a full key inside the session's project.
pub fn initial_state(project_key: &str, item: Option<&str>) -> Result<MeetingState, String> {
    let state = MeetingState::new(project_key);
    let Some(item) = item.map(str::trim) else {
        return Ok(state);
    };
    if find_item_key(item) != Some(item) {
        return Err(format!(
            "--item expects an issue key such as {}-123, got '{}'",
            project_key, item
        ));
    }
    if !belongs_to_project(item, project_key) {
        return Err(format!(
            "--item {} is not in project {}",
            item, project_key
        ));
    }
    Ok(state.with_active_item(item))
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionReply {
    Submitted(SubmitResult),
    Resolved {
        id: String,
        #[serde(flatten)]
        outcome: ResolveOutcome,
    },
    Queue {
        pending: Vec<Suggestion>,
    },
    Summary(MeetingArtifacts),
    Error {
        message: String,
    },
}

pub struct Session {
    state: MeetingState,
    pipeline: Pipeline,
}

impl Session {
    pub fn new(state: MeetingState, pipeline: Pipeline) -> Self {
        Self { state, pipeline }
    }

    pub fn state(&self) -> &MeetingState {
        &self.state
    }

    pub async fn handle_line(&mut self, line: &str) -> Option<SessionReply> {
        let command = match parse_command(line) {
            Ok(Some(c)) => c,
            Ok(None) => return None,
            Err(message) => return Some(SessionReply::Error { message }),
        };

        let reply = match command {
            Command::Utterance(text) => {
                SessionReply::Submitted(self.pipeline.submit_utterance(&mut self.state, &text).await)
            }
            Command::Resolve { id, decision } => {
                let outcome = self.pipeline.resolve_suggestion(&id, decision).await;
                SessionReply::Resolved { id, outcome }
            }
            Command::Queue => SessionReply::Queue {
                pending: self.pipeline.queue().pending(),
            },
            Command::Summary => SessionReply::Summary(generate_artifacts(
                self.state.transcript_history(),
                &self.pipeline.queue().snapshot(),
            )),
        };
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::queue::SuggestionQueue;
    use crate::state::PhraseConfig;
    use crate::tracker::fake::{transition, FakeTracker};
    use crate::types::SuggestionStatus;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command(" ALPHA-1 is done "),
            Ok(Some(Command::Utterance("ALPHA-1 is done".to_string())))
        );
        assert_eq!(
            parse_command("/dismiss abc"),
            Ok(Some(Command::Resolve {
                id: "abc".to_string(),
                decision: Decision::Reject
            }))
        );
        assert_eq!(parse_command("/queue"), Ok(Some(Command::Queue)));
        assert!(parse_command("/accept").is_err());
        assert!(parse_command("/launch abc").is_err());
    }

    #[test]
    fn test_initial_state_checks_item_project() {
        let state = initial_state("ALPHA", None).unwrap();
        assert_eq!(state.active_item_id(), None);

        let state = initial_state("ALPHA", Some(" ALPHA-12 ")).unwrap();
        assert_eq!(state.active_item_id(), Some("ALPHA-12"));

        assert!(initial_state("ALPHA", Some("BETA-9")).is_err());
        assert!(initial_state("ALPHA", Some("ALPHABET-9")).is_err());
        assert!(initial_state("ALPHA", Some("alpha-9")).is_err());
        assert!(initial_state("ALPHA", Some("ALPHA-9 and more")).is_err());
    }

    fn session(tracker: Arc<FakeTracker>) -> Session {
        let pipeline = Pipeline::new(
            tracker,
            Arc::new(SuggestionQueue::new()),
            &PhraseConfig::default(),
        );
        Session::new(MeetingState::new("ALPHA"), pipeline)
    }

    #[tokio::test]
    async fn test_session_flow() {
        let tracker = Arc::new(FakeTracker::new().with_transitions(
            "ALPHA-7",
            vec![transition("31", "Done", "Done", Some(3))],
        ));
        let mut session = session(tracker.clone());

        assert!(session.handle_line("").await.is_none());

        let Some(SessionReply::Submitted(result)) =
            session.handle_line("ALPHA-7 is finished").await
        else {
            panic!("Expected Submitted reply");
        };
        let id = result.new_suggestions[0].id.clone();

        match session.handle_line("/queue").await {
            Some(SessionReply::Queue { pending }) => assert_eq!(pending.len(), 1),
            other => panic!("Expected Queue, got {:?}", other),
        }

        match session.handle_line(&format!("/accept {}", id)).await {
            Some(SessionReply::Resolved { outcome, .. }) => {
                assert!(outcome.applied);
                assert_eq!(outcome.status, Some(SuggestionStatus::Accepted));
            }
            other => panic!("Expected Resolved, got {:?}", other),
        }

        match session.handle_line("/summary").await {
            Some(SessionReply::Summary(artifacts)) => {
                assert_eq!(
                    artifacts.action_items,
                    vec!["Update ALPHA-7: Move to Done (→ Done)".to_string()]
                );
            }
            other => panic!("Expected Summary, got {:?}", other),
        }
        assert_eq!(session.state().transcript_history().len(), 1);
        assert_eq!(tracker.apply_count(), 1);
    }

    #[tokio::test]
    async fn test_reply_serialization() {
        let mut session = session(Arc::new(FakeTracker::new()));
        let reply = session.handle_line("/reject missing").await.unwrap();
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "resolved");
        assert_eq!(json["id"], "missing");
        assert_eq!(json["ok"], false);

        let reply = session.handle_line("/nope").await.unwrap();
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "error");
    }
}
