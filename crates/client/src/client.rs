//! Scripts HTTP client.
//!
//! Blocking reqwest client (no async runtime required).
//! Two calls: download a script's content, update it in place.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::StatusCode;

use crate::auth::{load_auth, AuthCredentials};
use crate::error::ScriptsError;

/// Timeout applied when the caller does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque script identifier as assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScriptId(pub u64);

impl std::fmt::Display for ScriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ScriptId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ScriptId)
            .map_err(|_| format!("invalid script id '{}' (expected a number)", s))
    }
}

/// The two remote operations an edit session depends on.
///
/// Implemented by [`ScriptsClient`] for the real service; tests substitute
/// in-memory fakes.
pub trait ScriptsApi: Send + Sync {
    /// Fetch the script's current text.
    fn download_script(&self, id: ScriptId) -> Result<String, ScriptsError>;

    /// Replace the script's text. `name` is sent as the uploaded file name.
    fn update_script(&self, id: ScriptId, content: &str, name: &str) -> Result<(), ScriptsError>;
}

/// Scripts API client (blocking).
#[derive(Clone)]
pub struct ScriptsClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl ScriptsClient {
    /// Create a new client using saved auth credentials.
    pub fn from_saved_auth(timeout: Duration) -> Result<Self, ScriptsError> {
        let creds = load_auth().ok_or(ScriptsError::NotAuthenticated)?;
        Self::new(creds, timeout)
    }

    /// Create a new client with explicit credentials.
    pub fn new(creds: AuthCredentials, timeout: Duration) -> Result<Self, ScriptsError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("scriptedit/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ScriptsError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: creds.api_base.trim_end_matches('/').to_string(),
            token: creds.token,
        })
    }

    /// Client against an explicit base URL (tests, self-hosted overrides).
    pub fn with_base_url(token: String, base_url: String) -> Result<Self, ScriptsError> {
        Self::new(AuthCredentials::new(token, base_url), DEFAULT_TIMEOUT)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn script_url(&self, id: ScriptId) -> String {
        format!("{}/api/latest/fleet/scripts/{}", self.api_base, id)
    }

    fn check(id: ScriptId, response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, ScriptsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ScriptsError::Validation(body),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ScriptsError::Unauthorized(body),
            StatusCode::NOT_FOUND => ScriptsError::NotFound(id.0),
            other => ScriptsError::Http(other.as_u16(), body),
        })
    }
}

impl ScriptsApi for ScriptsClient {
    fn download_script(&self, id: ScriptId) -> Result<String, ScriptsError> {
        let url = self.script_url(id);
        log::debug!("GET {} (download)", url);

        let response = self.http.get(&url)
            .query(&[("alt", "media")])
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| ScriptsError::Network(e.to_string()))?;

        Self::check(id, response)?
            .text()
            .map_err(|e| ScriptsError::Network(e.to_string()))
    }

    fn update_script(&self, id: ScriptId, content: &str, name: &str) -> Result<(), ScriptsError> {
        let url = self.script_url(id);
        log::debug!("PATCH {} ({} bytes)", url, content.len());

        let part = Part::text(content.to_string()).file_name(name.to_string());
        let form = Form::new().part("script", part);

        let response = self.http.patch(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .map_err(|e| ScriptsError::Network(e.to_string()))?;

        Self::check(id, response)?;
        Ok(())
    }
}
