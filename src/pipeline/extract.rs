//! Ticket reference extraction.
//!
//! Finds the first work-item key (`ALPHA-123`) in an utterance. No key means
//! the speaker is still on the ticket already in focus, so the state is left alone.

use std::sync::OnceLock;

use regex::Regex;

use crate::state::StateUpdate;

fn re_item_key() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]+-[0-9]+").unwrap())
}

/// First item key in `utterance`, if any.
pub fn find_item_key(utterance: &str) -> Option<&str> {
    re_item_key().find(utterance).map(|m| m.as_str())
}

pub fn extract(utterance: &str) -> StateUpdate {
    match find_item_key(utterance) {
        Some(key) => {
            log::debug!("Extractor: found item reference {}", key);
            StateUpdate::focus(key)
        }
        None => StateUpdate::none(),
    }
}
