//! Error type for scripts API calls and the shared reason extractor.

/// Shown when a failure carries no usable reason.
pub const DEFAULT_ERROR_MESSAGE: &str = "Couldn't save script. Please try again.";

/// Error type for scripts API operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptsError {
    /// No auth credentials configured
    NotAuthenticated,
    /// Transport failure (DNS, connect, timeout, aborted request)
    Network(String),
    /// Server rejected the request body (400/422)
    Validation(String),
    /// Token missing, expired, or lacking permission (401/403)
    Unauthorized(String),
    /// No script with this id
    NotFound(u64),
    /// Any other non-success status, with the response body
    Http(u16, String),
}

impl std::fmt::Display for ScriptsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptsError::NotAuthenticated => write!(f, "Not authenticated; run `scriptedit login` first"),
            ScriptsError::Network(msg) => write!(f, "Network error: {}", msg),
            ScriptsError::Validation(msg) => write!(f, "{}", msg),
            ScriptsError::Unauthorized(msg) if msg.is_empty() => write!(f, "Permission denied"),
            ScriptsError::Unauthorized(msg) => write!(f, "Permission denied: {}", msg),
            ScriptsError::NotFound(id) => write!(f, "Script {} not found", id),
            ScriptsError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
        }
    }
}

impl std::error::Error for ScriptsError {}

/// Extract a human-readable reason from a failed call.
///
/// Response bodies shaped like `{"message": "...", "errors": [{"name": "...",
/// "reason": "..."}]}` yield the first `reason`, then `message`. Other bodies
/// are used as-is (trimmed). Errors without a body use their `Display`.
pub fn error_message(err: &ScriptsError) -> String {
    let message = match err {
        ScriptsError::Validation(body)
        | ScriptsError::Unauthorized(body)
        | ScriptsError::Http(_, body) => {
            body_reason(body).unwrap_or_else(|| err.to_string())
        }
        other => other.to_string(),
    };

    let message = message.trim();
    if message.is_empty() {
        DEFAULT_ERROR_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

fn body_reason(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    let reason = json["errors"]
        .as_array()
        .and_then(|errors| errors.iter().find_map(|e| e["reason"].as_str()))
        .filter(|r| !r.trim().is_empty());
    if let Some(reason) = reason {
        return Some(reason.to_string());
    }

    json["message"]
        .as_str()
        .filter(|m| !m.trim().is_empty())
        .map(String::from)
}
