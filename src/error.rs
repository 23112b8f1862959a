//! Error types for tracker calls and configuration loading.
//!
//! Tracker errors are classified by recoverability:
//! - Retryable: network issues, 5xx responses
//! - RequiresUserAction: missing or rejected credentials
//! - NonRetryable: everything else (bad transition id, malformed payloads)
//!
//! The pipeline never retries on its own; the classification only shapes the
//! notice shown to the reviewer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the issue tracker (list/apply transitions, project lookup).
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Tracker API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Tracker rejected the credentials")]
    Unauthorized,

    #[error("Failed to parse tracker response: {0}")]
    Parse(String),

    #[error("Tracker not configured: {0}")]
    NotConfigured(String),
}

impl TrackerError {
    /// Returns true if trying the same call again later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackerError::Network(_) => true,
            TrackerError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns true if a person has to fix credentials or config first.
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            TrackerError::Unauthorized | TrackerError::NotConfigured(_)
        )
    }

    /// Short hint appended to the failure notice shown to the reviewer.
    pub fn recovery_suggestion(&self) -> &'static str {
        if self.requires_user_action() {
            return "Check JIRA_DOMAIN, JIRA_EMAIL and JIRA_API_TOKEN.";
        }
        if self.is_retryable() {
            return "The tracker is unavailable right now. Accept again to retry.";
        }
        match self {
            TrackerError::Api { status: 404, .. } => "The issue no longer exists or is not visible.",
            TrackerError::Api { .. } => {
                "The tracker refused this transition. Check the issue's workflow."
            }
            _ => "Check the tracker logs for details.",
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TrackerError::Parse(err.to_string())
        } else {
            TrackerError::Network(err.to_string())
        }
    }
}

/// Errors while loading `config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found at {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config: {0}")]
    Io(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TrackerError::Network("reset".into()).is_retryable());
        assert!(TrackerError::Api {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!TrackerError::Api {
            status: 400,
            body: String::new()
        }
        .is_retryable());
        assert!(!TrackerError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_unauthorized_needs_user_action() {
        let err = TrackerError::Unauthorized;
        assert!(err.requires_user_action());
        assert!(err.recovery_suggestion().contains("JIRA_API_TOKEN"));
    }

    #[test]
    fn test_not_found_hint() {
        let err = TrackerError::Api {
            status: 404,
            body: "Issue does not exist".into(),
        };
        assert_eq!(
            err.recovery_suggestion(),
            "The issue no longer exists or is not visible."
        );
        assert_eq!(
            err.to_string(),
            "Tracker API error 404: Issue does not exist"
        );
    }
}
