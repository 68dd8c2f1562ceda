//! GitHub API error types.

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("GitHub returned HTTP {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl GitHubError {
    /// Whether another attempt may succeed (connection failures and timeouts only).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_transient(),
            _ => false,
        }
    }

    /// HTTP status code, if the server answered with an error status.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build a status error from an unsuccessful response body.
    pub(crate) fn from_status(status: u16, url: &str, body: &[u8]) -> Self {
        Self::Status {
            status,
            url: url.to_string(),
            message: error_message(body),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// GitHub error bodies look like `{"message": "Not Found", "documentation_url": ...}`.
fn error_message(body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return parsed.message;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        "empty response body".to_string()
    } else {
        text.chars().take(200).collect()
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps multi-line transport
/// errors readable in progress output and logs.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}
