use std::time::Duration;

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectivityError {
    #[error("health check timed out after {0:?}")]
    Timeout(Duration),
    #[error("backend unreachable: {0}")]
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("credentials rejected: {0}")]
    Rejected(String),
    #[error("login accepted but identity lookup failed: {0}")]
    IdentityLookup(String),
    #[error("a session is already active")]
    AlreadyAuthenticated,
    #[error("login request failed: {0}")]
    Transport(String),
}

impl AuthError {
    pub(crate) fn from_login_failure(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ApiError>() {
            Some(api) if api.code.is_auth() || api.code == ErrorCode::Validation => {
                AuthError::Rejected(api.message.clone())
            }
            _ => AuthError::Transport(format!("{err:#}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("no signed-in owner")]
    NoIdentity,
    #[error("request is not scoped to the signed-in owner")]
    OwnerMismatch,
    #[error("restaurant name must not be empty")]
    EmptyName,
    #[error("response arrived after the session changed; discarded")]
    StaleResponse,
    #[error("backend request failed: {0}")]
    Backend(String),
}

impl DataError {
    pub(crate) fn backend(err: &anyhow::Error) -> Self {
        DataError::Backend(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Auth,
    Data,
}

/// Inline failure message the presentation layer shows to the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotice {
    pub kind: NoticeKind,
    pub message: String,
    pub detail: String,
}

impl UserNotice {
    pub fn login_failed(err: &AuthError) -> Self {
        let message = match err {
            AuthError::AlreadyAuthenticated => "You are already signed in.",
            _ => "Login failed. Please check your credentials.",
        };
        Self {
            kind: NoticeKind::Auth,
            message: message.to_string(),
            detail: err.to_string(),
        }
    }

    pub fn load_failed(err: &DataError) -> Self {
        Self {
            kind: NoticeKind::Data,
            message: "Failed to load restaurants.".to_string(),
            detail: err.to_string(),
        }
    }

    pub fn create_failed(err: &DataError) -> Self {
        Self {
            kind: NoticeKind::Data,
            message: "Error creating restaurant. Please check the form and try again."
                .to_string(),
            detail: err.to_string(),
        }
    }
}
