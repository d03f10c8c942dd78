//! Error types for password service calls.
//!
//! Every non-2xx response is classified by status so callers can tell a
//! duplicate entry from an expired session from a generic failure.

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse failure category, used by callers to pick a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was obtained (connect, TLS, timeout).
    Network,
    /// Token missing, invalid or expired.
    Authentication,
    /// The addressed resource (entry or user) does not exist.
    NotFound,
    /// The server rejected the input.
    Validation,
    /// The write collides with existing data (duplicate service + username).
    Conflict,
    /// Anything else, including malformed response bodies.
    Unknown,
}

/// Error type for password service operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level HTTP error from reqwest.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401 or 403.
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    /// 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400 or 422.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// 409.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success status.
    #[error("Server error: {status} - {message}")]
    Server {
        /// The HTTP status code returned by the server.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// Response body did not match the expected schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base URL or path could not be joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Token store failure.
    #[error("Storage error: {0}")]
    Storage(#[from] nuvault_storage::StorageError),
}

/// Result type alias for password service operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build an error from a non-success response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(message)
            }
            StatusCode::CONFLICT => Self::Conflict(message),
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_decode() => ErrorKind::Unknown,
            Self::Http(_) => ErrorKind::Network,
            Self::Unauthorized(_) => ErrorKind::Authentication,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Server { .. } | Self::Json(_) | Self::InvalidUrl(_) | Self::Storage(_) => {
                ErrorKind::Unknown
            }
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// True when the server no longer recognises the session's user.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Authentication | ErrorKind::NotFound
        )
    }

    /// Message suitable for showing to the user.
    ///
    /// Conflict and validation failures carry the server's own wording
    /// (e.g. "duplicate service"); everything else gets a generic line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Conflict(message) | Self::Validation(message) => message.clone(),
            _ => match self.kind() {
                ErrorKind::Network => "Could not reach the server".to_string(),
                ErrorKind::Authentication => "Session expired, please log in again".to_string(),
                ErrorKind::NotFound => "The item no longer exists".to_string(),
                _ => "Could not save, please try again".to_string(),
            },
        }
    }

    /// Message for a failed read, where there is nothing to retry saving.
    pub fn read_message(&self) -> String {
        match self.kind() {
            ErrorKind::Network => "Could not reach the server".to_string(),
            ErrorKind::Authentication => "Session expired, please log in again".to_string(),
            _ => "Error loading passwords".to_string(),
        }
    }
}

/// Pull a human message out of a JSON error body.
///
/// Looks at `message`, then `error`, then `detail`. Non-JSON bodies yield
/// `None` so raw HTML error pages never reach the user.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .filter_map(|field| value.get(*field))
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "").kind(),
            ErrorKind::Authentication
        );
        assert_eq!(
            ApiError::from_status(StatusCode::FORBIDDEN, "").kind(),
            ErrorKind::Authentication
        );
        assert_eq!(
            ApiError::from_status(StatusCode::NOT_FOUND, "").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            ApiError::from_status(StatusCode::CONFLICT, "").kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "").kind(),
            ErrorKind::Unknown
        );
    }

    #[test]
    fn test_conflict_keeps_server_message() {
        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"message":"duplicate service"}"#);
        assert!(err.is_conflict());
        assert!(matches!(&err, ApiError::Conflict(m) if m == "duplicate service"));
        assert_eq!(err.user_message(), "duplicate service");
    }

    #[test]
    fn test_message_falls_back_to_reason_phrase() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extract_message_field_order() {
        assert_eq!(
            extract_message(r#"{"error":"password","message":"Invalid current password"}"#),
            Some("Invalid current password".to_string())
        );
        assert_eq!(
            extract_message(r#"{"error":"bad token"}"#),
            Some("bad token".to_string())
        );
        assert_eq!(
            extract_message(r#"{"detail":"nope","message":"  "}"#),
            Some("nope".to_string())
        );
        assert_eq!(extract_message(r#"{"status":1}"#), None);
        assert_eq!(extract_message("not json"), None);
    }

    #[test]
    fn test_auth_failure_covers_not_found_user() {
        assert!(ApiError::from_status(StatusCode::NOT_FOUND, "").is_auth_failure());
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_auth_failure());
        assert!(!ApiError::from_status(StatusCode::CONFLICT, "").is_auth_failure());
    }

    #[test]
    fn test_generic_user_message() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.user_message(), "Could not save, please try again");
    }

    #[test]
    fn test_read_message_never_mentions_saving() {
        let cases = [
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading passwords"),
            (StatusCode::NOT_FOUND, "Error loading passwords"),
            (StatusCode::CONFLICT, "Error loading passwords"),
            (StatusCode::UNAUTHORIZED, "Session expired, please log in again"),
        ];
        for (status, expected) in cases {
            assert_eq!(ApiError::from_status(status, "").read_message(), expected, "{status}");
        }
    }
}
