//! Contracts for the two external collaborators the core talks to.
//!
//! Both traits are object-safe so controllers can hold them as
//! `Arc<dyn ...>`; the HTTP implementations live in the client crate and
//! tests substitute in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::analysis::AnalysisRequest;

/// Session as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
}

impl Session {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Rejection from the identity provider. The message is shown to the user
/// exactly as the provider wrote it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for identity provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Authentication primitives. The provider owns the session lifecycle; the
/// core only observes it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account. Completion requires out-of-band email
    /// confirmation, so no session is established.
    async fn sign_up(&self, email: &str, password: &str) -> ProviderResult<()>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ProviderResult<Session>;

    /// Look up the currently active session, if any.
    async fn get_session(&self) -> ProviderResult<Option<Session>>;

    /// Ask the provider to email a reset link that lands on `redirect_to`.
    async fn reset_password_for_email(&self, email: &str, redirect_to: &str)
    -> ProviderResult<()>;

    /// Set a new password for the user owning the current session.
    async fn update_password(&self, password: &str) -> ProviderResult<()>;

    async fn sign_out(&self) -> ProviderResult<()>;
}

/// Failures talking to the scoring service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoringError {
    /// No response was received (connect failure, timeout, DNS).
    #[error("scoring service unreachable: {0}")]
    Unavailable(String),

    /// The service answered with a non-success status.
    #[error("scoring service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The service answered 2xx but the body was not JSON.
    #[error("scoring service sent an unreadable body: {0}")]
    Malformed(String),
}

/// Result type for scoring service calls
pub type ScoringResult<T> = Result<T, ScoringError>;

/// Remote résumé scoring. Bodies are returned as raw JSON because their
/// shape is not trusted; normalization happens in [`crate::analysis::shape`].
#[async_trait]
pub trait ScoringService: Send + Sync {
    /// `POST /analyze` with the job description and every résumé.
    async fn analyze(&self, request: &AnalysisRequest) -> ScoringResult<Value>;

    /// `GET /eligible/{email}`: eligible matches accumulated for the user.
    async fn eligible(&self, email: &str) -> ScoringResult<Value>;
}
