//! Typed error hierarchy for the taskboard client.
//!
//! Two enums cover the two subsystems:
//! - `ApiError`: everything a call through the request pipeline can fail with
//! - `SessionError`: session store persistence failures

use std::fmt;
use std::path::PathBuf;

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// The server's error document for a non-2xx response.
///
/// Kept as raw JSON because the server uses several shapes: `{"detail": ..}`
/// from the auth layer, `{"error": .., "message": ..}` from the custom
/// handler, and `{"field": ["msg"]}` from validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    json: Option<serde_json::Value>,
    text: String,
}

impl ErrorBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes).into_owned();
        let json = serde_json::from_slice(bytes).ok();
        Self { json, text }
    }

    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Machine-readable error code, e.g. `token_not_valid`.
    pub fn code(&self) -> Option<&str> {
        self.json.as_ref()?.get("code")?.as_str()
    }

    /// The message a user should see for this error.
    pub fn detail(&self) -> String {
        if let Some(serde_json::Value::Object(map)) = &self.json {
            for key in ["detail", "message", "error"] {
                if let Some(msg) = map.get(key).and_then(|v| v.as_str()) {
                    return msg.to_string();
                }
            }
            for (field, value) in map {
                let first = match value {
                    serde_json::Value::Array(items) => items.first().and_then(|v| v.as_str()),
                    serde_json::Value::String(s) => Some(s.as_str()),
                    _ => None,
                };
                if let Some(msg) = first {
                    return if field == "non_field_errors" {
                        msg.to_string()
                    } else {
                        format!("{}: {}", field, msg)
                    };
                }
            }
        }
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            "no response body".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail())
    }
}

/// Errors from the request pipeline and the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{method} {path} failed with {status}: {body}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        body: ErrorBody,
    },

    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Token refresh rejected with {status}: {body}")]
    RefreshFailed { status: StatusCode, body: ErrorBody },

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// HTTP status of the response that caused this error, if there was one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } | ApiError::RefreshFailed { status, .. } => {
                Some(*status)
            }
            ApiError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// True when the session was torn down because of this error.
    pub fn ended_session(&self) -> bool {
        matches!(
            self,
            ApiError::RefreshFailed { .. } | ApiError::SessionExpired
        )
    }

    /// Server-provided message for inline display, falling back to the error text.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Status { body, .. } | ApiError::RefreshFailed { body, .. } => body.detail(),
            other => other.to_string(),
        }
    }
}

/// Errors from persisting or loading the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session file at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize session: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Session store lock poisoned")]
    LockPoisoned,
}
