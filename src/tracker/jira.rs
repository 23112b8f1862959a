//! REST client for the Jira Cloud API.
//!
//! Uses reqwest with Basic auth (`email:apiToken`). All calls target
//! `https://<domain>/rest/api/3/...`.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Tracker, Transition};
use crate::error::TrackerError;
use crate::state::JiraConfig;

/// Minimal project info used to confirm the session's project key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraProject {
    pub id: String,
    pub key: String,
    pub name: String,
}

pub struct JiraClient {
    client: reqwest::Client,
    base_url: Url,
    auth: String,
}

/// Jira Cloud site root for a configured domain. A pasted scheme is dropped;
/// requests always go over https.
fn site_url(domain: &str) -> String {
    let host = domain.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    format!("https://{}", host.trim_end_matches('/'))
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self, TrackerError> {
        let (Some(domain), Some(email), Some(token)) = (
            config.domain.as_deref(),
            config.email.as_deref(),
            config.api_token.as_deref(),
        ) else {
            return Err(TrackerError::NotConfigured(
                "domain, email and apiToken are required".to_string(),
            ));
        };

        Self::with_base_url(
            &site_url(domain),
            email,
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_base_url(
        base_url: &str,
        email: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TrackerError::NotConfigured(format!("invalid Jira URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TrackerError::NotConfigured(format!(
                "invalid Jira URL: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let credentials = format!("{}:{}", email, token);

        Ok(Self {
            client,
            base_url,
            auth: base64::engine::general_purpose::STANDARD.encode(credentials),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TrackerError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TrackerError::NotConfigured("Jira URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, TrackerError> {
        let resp = request
            .header("Authorization", format!("Basic {}", self.auth))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TrackerError::Network(format!("Jira request failed: {}", e)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TrackerError::Unauthorized);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(TrackerError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, TrackerError> {
        let resp = self.send(self.client.get(url)).await?;
        resp.json()
            .await
            .map_err(|e| TrackerError::Parse(format!("Failed to parse Jira response: {}", e)))
    }

    /// Look up a project by key.
    pub async fn fetch_project(&self, key: &str) -> Result<JiraProject, TrackerError> {
        let url = self.endpoint(&["rest", "api", "3", "project", key])?;
        self.get_json(url).await
    }

    pub async fn fetch_transitions(&self, issue_key: &str) -> Result<Vec<Transition>, TrackerError> {
        #[derive(Deserialize)]
        struct TransitionsResponse {
            #[serde(default)]
            transitions: Vec<TransitionNode>,
        }
        #[derive(Deserialize)]
        struct TransitionNode {
            id: String,
            #[serde(default)]
            name: String,
            to: Option<StatusNode>,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct StatusNode {
            #[serde(default)]
            name: String,
            status_category: Option<CategoryNode>,
        }
        #[derive(Deserialize)]
        struct CategoryNode {
            id: u32,
        }

        let url = self.endpoint(&["rest", "api", "3", "issue", issue_key, "transitions"])?;
        let resp: TransitionsResponse = self.get_json(url).await?;

        Ok(resp
            .transitions
            .into_iter()
            .map(|t| Transition {
                id: t.id,
                name: t.name,
                target_status_name: t.to.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
                target_status_category_id: t
                    .to
                    .as_ref()
                    .and_then(|s| s.status_category.as_ref())
                    .map(|c| c.id),
            })
            .collect())
    }

    pub async fn transition_issue(
        &self,
        issue_key: &str,
        transition_id: &str,
    ) -> Result<(), TrackerError> {
        let url = self.endpoint(&["rest", "api", "3", "issue", issue_key, "transitions"])?;
        let body = serde_json::json!({ "transition": { "id": transition_id } });
        self.send(self.client.post(url).json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl Tracker for JiraClient {
    async fn list_transitions(&self, item_id: &str) -> Result<Vec<Transition>, TrackerError> {
        self.fetch_transitions(item_id).await
    }

    async fn apply_transition(
        &self,
        item_id: &str,
        transition_id: &str,
    ) -> Result<(), TrackerError> {
        self.transition_issue(item_id, transition_id).await
    }
}
