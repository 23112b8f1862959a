//! Meeting state threaded through one pipeline run, and the config it starts from.
//!
//! Stages never mutate `MeetingState` directly. Each stage returns a
//! [`StateUpdate`] and the orchestrator folds it in with [`MeetingState::apply`],
//! following a fixed per-field merge policy:
//!
//! | Field                | Policy                                          |
//! |----------------------|-------------------------------------------------|
//! | `active_project_key` | set once at session start, never updated        |
//! | `active_item_id`     | keep if absent, replace if non-empty, clear if explicitly cleared |
//! | `transcript_history` | append                                          |

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Update to a scalar field. `Replace` with an empty value behaves like `Keep`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Replace(T),
    Clear,
}

impl FieldUpdate<String> {
    fn merge(self, current: Option<String>) -> Option<String> {
        match self {
            FieldUpdate::Keep => current,
            FieldUpdate::Replace(v) if v.is_empty() => current,
            FieldUpdate::Replace(v) => Some(v),
            FieldUpdate::Clear => None,
        }
    }
}

/// Partial update produced by a pipeline stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub active_item_id: FieldUpdate<String>,
    pub transcript: Vec<String>,
}

impl StateUpdate {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn focus(item_id: impl Into<String>) -> Self {
        Self {
            active_item_id: FieldUpdate::Replace(item_id.into()),
            ..Self::default()
        }
    }

    pub fn clear_focus() -> Self {
        Self {
            active_item_id: FieldUpdate::Clear,
            ..Self::default()
        }
    }

    pub fn append_transcript(utterance: impl Into<String>) -> Self {
        Self {
            transcript: vec![utterance.into()],
            ..Self::default()
        }
    }
}

/// Running context for one meeting. Owned by the caller between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingState {
    active_project_key: String,
    active_item_id: Option<String>,
    transcript_history: Vec<String>,
}

impl MeetingState {
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            active_project_key: project_key.into(),
            active_item_id: None,
            transcript_history: Vec::new(),
        }
    }

    /// Start with an item already in focus (e.g. picked on the board).
    pub fn with_active_item(mut self, item_id: impl Into<String>) -> Self {
        self.apply(StateUpdate::focus(item_id));
        self
    }

    pub fn active_project_key(&self) -> &str {
        &self.active_project_key
    }

    pub fn active_item_id(&self) -> Option<&str> {
        self.active_item_id.as_deref()
    }

    pub fn transcript_history(&self) -> &[String] {
        &self.transcript_history
    }

    /// Fold a stage's update into the state using the merge policy above.
    pub fn apply(&mut self, update: StateUpdate) {
        self.active_item_id = update.active_item_id.merge(self.active_item_id.take());
        self.transcript_history.extend(update.transcript);
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Config stored in ~/.ceremony/config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub project_key: String,
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub phrases: PhraseConfig,
}

/// Jira Cloud connection settings. Environment variables take precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            domain: None,
            email: None,
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl JiraConfig {
    pub fn is_complete(&self) -> bool {
        [&self.domain, &self.email, &self.api_token]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Keyword lists used by the intent classifier. Matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhraseConfig {
    pub completion: Vec<String>,
    pub started: Vec<String>,
    pub blocked: Vec<String>,
    pub pacing: Vec<String>,
    pub off_topic: Vec<String>,
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for PhraseConfig {
    fn default() -> Self {
        Self {
            completion: phrases(&["finished", "done", "completed"]),
            started: phrases(&["starting", "working on", "picked up"]),
            blocked: phrases(&["blocked", "stuck"]),
            pacing: phrases(&["running late", "time check", "wrap up"]),
            off_topic: phrases(&[
                "weekend",
                "vacation",
                "lunch",
                "birthday",
                "family",
                "movie",
                "game last night",
            ]),
        }
    }
}

/// Resolve the config path: `CEREMONY_CONFIG`, else ~/.ceremony/config.json.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var("CEREMONY_CONFIG") {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let home = dirs::home_dir()
        .ok_or_else(|| ConfigError::Invalid("Could not find home directory".to_string()))?;
    Ok(home.join(".ceremony").join("config.json"))
}

/// Load and validate the config, then apply `JIRA_*` environment overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let mut config: Config =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    config.project_key = config.project_key.trim().to_string();
    validate_project_key(&config.project_key)?;

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    if !config.jira.is_complete() {
        log::warn!("Jira credentials incomplete; tracker calls will fail until configured");
    }

    Ok(config)
}

fn validate_project_key(key: &str) -> Result<(), ConfigError> {
    if key.is_empty() {
        return Err(ConfigError::Invalid("projectKey must not be empty".to_string()));
    }
    if !key.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ConfigError::Invalid(format!(
            "projectKey must be uppercase letters only, got '{}'",
            key
        )));
    }
    Ok(())
}

/// Override the `jira` block from `JIRA_DOMAIN`, `JIRA_EMAIL`, `JIRA_API_TOKEN`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    if let Some(domain) = non_empty("JIRA_DOMAIN") {
        config.jira.domain = Some(domain);
    }
    if let Some(email) = non_empty("JIRA_EMAIL") {
        config.jira.email = Some(email);
    }
    if let Some(token) = non_empty("JIRA_API_TOKEN") {
        config.jira.api_token = Some(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_update_keeps_item() {
        let mut state = MeetingState::new("ALPHA").with_active_item("ALPHA-1");
        state.apply(StateUpdate::none());
        assert_eq!(state.active_item_id(), Some("ALPHA-1"));
    }

    #[test]
    fn test_empty_replace_keeps_item() {
        let mut state = MeetingState::new("ALPHA").with_active_item("ALPHA-1");
        state.apply(StateUpdate::focus(""));
        assert_eq!(state.active_item_id(), Some("ALPHA-1"));
    }

    #[test]
    fn test_replace_and_clear() {
        let mut state = MeetingState::new("ALPHA").with_active_item("ALPHA-1");
        state.apply(StateUpdate::focus("ALPHA-2"));
        assert_eq!(state.active_item_id(), Some("ALPHA-2"));
        state.apply(StateUpdate::clear_focus());
        assert_eq!(state.active_item_id(), None);
        assert_eq!(state.active_project_key(), "ALPHA");
    }

    #[test]
    fn test_transcript_appends() {
        let mut state = MeetingState::new("ALPHA");
        state.apply(StateUpdate::append_transcript("first"));
        state.apply(StateUpdate::append_transcript("second"));
        assert_eq!(state.transcript_history(), ["first", "second"]);
    }

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_defaults() {
        let file = write_config(r#"{ "projectKey": " ALPHA " }"#);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.project_key, "ALPHA");
        assert_eq!(config.jira.timeout_secs, 30);
        assert_eq!(config.phrases, PhraseConfig::default());
    }

    #[test]
    fn test_load_config_partial_phrases() {
        let file = write_config(
            r#"{ "projectKey": "ALPHA", "phrases": { "offTopic": ["football"] } }"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.phrases.off_topic, vec!["football".to_string()]);
        assert_eq!(config.phrases.completion, PhraseConfig::default().completion);
    }

    #[test]
    fn test_load_config_rejects_bad_project_key() {
        let file = write_config(r#"{ "projectKey": "alpha-1" }"#);
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let file = write_config(r#"{ "projectKey": "" }"#);
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(matches!(load_config(&path), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_config_malformed() {
        let file = write_config("{ not json");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config: Config = serde_json::from_str(
            r#"{ "projectKey": "ALPHA", "jira": { "domain": "old.atlassian.net", "email": "a@b.c" } }"#,
        )
        .unwrap();
        assert!(!config.jira.is_complete());

        apply_env_overrides(&mut config, |name| match name {
            "JIRA_DOMAIN" => Some("new.atlassian.net".to_string()),
            "JIRA_API_TOKEN" => Some("secret".to_string()),
            "JIRA_EMAIL" => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.jira.domain.as_deref(), Some("new.atlassian.net"));
        assert_eq!(config.jira.email.as_deref(), Some("a@b.c"));
        assert!(config.jira.is_complete());
    }
}
