//! Blocking HTTP client for a running qatrace server.
//!
//! The client side owns the draft: it merges checklists, lets the tester trim
//! the list, and only hands it to the server on confirmation. After that the
//! server copy is authoritative and the client syncs one item at a time.

use crate::models::{ChecklistDraft, ChecklistItem, DraftItem, SessionId, StatusUpdate};
use crate::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// User-Agent header sent with every request
const USER_AGENT: &str = concat!("qatrace/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct FeaturesResponse {
    features: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MergeResponse {
    checklists: Vec<DraftItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    test_data: Vec<ChecklistItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the checklist and session endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Feature names the server's catalog offers.
    pub fn features(&self) -> Result<Vec<String>> {
        let response = self.agent.get(&self.url("/checklists/features")).call();
        let body: FeaturesResponse = parse_response(response)?;
        Ok(body.features)
    }

    /// Merge the selected features into a fresh client draft.
    pub fn merge(&self, features: &[String]) -> Result<ChecklistDraft> {
        if features.is_empty() {
            return Err(Error::Validation(
                "Please select at least one feature.".to_string(),
            ));
        }
        let response = self
            .agent
            .post(&self.url("/checklists:merge"))
            .send_json(serde_json::json!({ "features": features }));
        let body: MergeResponse = parse_response(response)?;
        Ok(ChecklistDraft::new(body.checklists))
    }

    /// Confirm a draft, creating a session. Returns the session id.
    pub fn create_session(&self, draft: &ChecklistDraft) -> Result<String> {
        if draft.is_empty() {
            return Err(Error::Validation(
                "No checklists have been selected.".to_string(),
            ));
        }
        let response = self
            .agent
            .post(&self.url("/sessions:create"))
            .send_json(serde_json::json!({ "checklists": draft.items() }));
        let body: CreateSessionResponse = parse_response(response)?;
        Ok(body.session_id)
    }

    /// Fetch the authoritative item list of a session.
    pub fn fetch_session(&self, session_id: &str) -> Result<Vec<ChecklistItem>> {
        let response = self
            .agent
            .get(&self.url(&session_path(session_id, "")?))
            .call();
        let body: SessionResponse = parse_response(response)?;
        Ok(body.test_data)
    }

    /// Push one item's new status and bug reference.
    pub fn update_status(
        &self,
        session_id: &str,
        item_id: &str,
        update: &StatusUpdate,
    ) -> Result<()> {
        let response = self
            .agent
            .post(&self.url(&session_path(session_id, "/items:update")?))
            .send_json(serde_json::json!({
                "checklistItemId": item_id,
                "status": update.status,
                "bugId": update.bug_id,
            }));
        let _: serde_json::Value = parse_response(response)?;
        Ok(())
    }
}

/// `/sessions/<id><suffix>`. Ids that no session could carry never reach the
/// server, so they cannot select a different route.
fn session_path(session_id: &str, suffix: &str) -> Result<String> {
    if !SessionId::is_well_formed(session_id) {
        return Err(Error::NotFound("Test session not found.".to_string()));
    }
    Ok(format!("/sessions/{}{}", session_id, suffix))
}

/// Decode a success body, or turn the server's error body into an [`Error`].
fn parse_response<T: DeserializeOwned>(
    response: std::result::Result<ureq::Response, ureq::Error>,
) -> Result<T> {
    match response {
        Ok(resp) => resp
            .into_json()
            .map_err(|e| Error::Http(format!("invalid response body: {}", e))),
        Err(ureq::Error::Status(code, resp)) => {
            let message = resp
                .into_json::<ErrorBody>()
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("HTTP {}", code));
            Err(match code {
                400 => Error::Validation(message),
                404 => Error::NotFound(message),
                _ => Error::Http(format!("HTTP {}: {}", code, message)),
            })
        }
        Err(e) => Err(Error::Http(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.url("/sessions:create"),
            "http://localhost:3000/sessions:create"
        );
    }

    #[test]
    fn test_empty_inputs_rejected_without_request() {
        // Nothing listens on port 9; a request would fail with Http instead
        let client = ApiClient::new("http://127.0.0.1:9");
        assert!(matches!(client.merge(&[]), Err(Error::Validation(_))));
        assert!(matches!(
            client.create_session(&ChecklistDraft::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_unreachable_server_is_http_error() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.fetch_session("abc").unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn test_malformed_session_ids_never_sent() {
        let client = ApiClient::new("http://127.0.0.1:9");
        for id in ["", "../health", "abc/items:update", "abc?x=1", "abc#frag"] {
            assert!(
                matches!(client.fetch_session(id), Err(Error::NotFound(_))),
                "{:?} reached the network",
                id
            );
        }
        let update = StatusUpdate::from_client(crate::models::ItemStatus::Pass, None);
        assert!(matches!(
            client.update_status("a/b", "C1", &update),
            Err(Error::NotFound(_))
        ));
    }
}
