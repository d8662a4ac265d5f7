use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Unavailable,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::NotFound,
            400 | 409 | 422 => ErrorCode::Validation,
            502..=504 => ErrorCode::Unavailable,
            _ => ErrorCode::Internal,
        }
    }

    pub fn is_auth(self) -> bool {
        matches!(self, ErrorCode::Unauthorized | ErrorCode::Forbidden)
    }
}

/// Error body as returned by the backend. `message` may be a single string or
/// a list of validation messages.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

impl ErrorBody {
    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code:?} ({status}): {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::from_status(status),
            status,
            message: message.into(),
        }
    }

    /// Builds an error from a raw response body, falling back to the body
    /// text when it is not the structured shape.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message_text())
            .unwrap_or_else(|| body.trim().to_string());
        let message = if message.is_empty() {
            format!("request failed with status {status}")
        } else {
            message
        };
        Self::new(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_validation_message_list() {
        let err = ApiError::from_body(
            400,
            r#"{"message":["name should not be empty","cuisine invalid"],"statusCode":400}"#,
        );
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.message, "name should not be empty; cuisine invalid");
    }

    #[test]
    fn plain_text_body_is_kept() {
        let err = ApiError::from_body(401, "Unauthorized");
        assert!(err.code.is_auth());
        assert_eq!(err.message, "Unauthorized");
    }

    #[test]
    fn empty_body_gets_status_message() {
        let err = ApiError::from_body(503, "");
        assert_eq!(err.code, ErrorCode::Unavailable);
        assert_eq!(err.message, "request failed with status 503");
    }
}
