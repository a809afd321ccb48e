//! Error taxonomy surfaced by the orchestration layer.

use thiserror::Error;

use crate::ports::{ProviderError, ScoringError};

/// Errors produced by the session controller, the analysis coordinator and
/// the cooldown gate. Every variant is terminal at the component that
/// produced it: it is turned into a notification and the triggering state
/// reverts to its pre-call value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Local precondition failed; nothing was sent over the network
    #[error("{0}")]
    Validation(String),

    /// Password reset requested again before the cooldown window elapsed
    #[error("Try again in {remaining_secs}s")]
    CooldownActive { remaining_secs: u32 },

    /// The scoring service could not be reached
    #[error("Scoring service unavailable: {0}")]
    BackendUnavailable(String),

    /// The scoring service responded with a failure
    #[error("Scoring service error ({status}): {message}")]
    BackendError { status: u16, message: String },

    /// The identity provider rejected the operation; message passed through
    #[error("{0}")]
    Identity(String),

    /// A response shape was not recognised. Only used for logging, the
    /// affected data falls back to an empty sequence.
    #[error("Unrecognised response shape: {0}")]
    MalformedResponse(String),

    /// An analysis request is already outstanding
    #[error("An analysis is already running")]
    InFlight,

    /// The action is not available in the current session state
    #[error("Not available while {0}")]
    NotPermitted(&'static str),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for errors raised before any network traffic happened.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::CooldownActive { .. } | Self::InFlight | Self::NotPermitted(_)
        )
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Identity(err.message)
    }
}

impl From<ScoringError> for ClientError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::Unavailable(reason) => Self::BackendUnavailable(reason),
            ScoringError::Status { status, message } => Self::BackendError { status, message },
            // A 2xx with an unreadable body still means a response arrived.
            ScoringError::Malformed(reason) => Self::BackendError {
                status: 200,
                message: reason,
            },
        }
    }
}

/// Result type for orchestration operations
pub type ClientResult<T> = Result<T, ClientError>;
