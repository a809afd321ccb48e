//! Session data models.

use std::fmt;

use super::cooldown::DEFAULT_RESET_COOLDOWN_SECS;

/// Where the provider should send the user after they follow a reset link.
pub const DEFAULT_RESET_REDIRECT: &str = "http://localhost:3000/login";

/// Where the user is in the authentication journey. Exactly one of these
/// holds at a time, so combinations such as "signing up while recovering"
/// cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session; login, signup and reset requests are available
    Anonymous,
    /// A login or signup call is outstanding
    Authenticating,
    Authenticated { email: String },
    /// Session established by a password-reset link; only a password
    /// update is permitted
    RecoveryPending { email: String },
}

impl SessionState {
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Authenticated { email } | Self::RecoveryPending { email } => Some(email),
            Self::Anonymous | Self::Authenticating => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Short description used in "not available while ..." messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Anonymous => "signed out",
            Self::Authenticating => "signing in",
            Self::Authenticated { .. } => "signed in",
            Self::RecoveryPending { .. } => "resetting the password",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "signed out"),
            Self::Authenticating => write!(f, "signing in..."),
            Self::Authenticated { email } => write!(f, "signed in as {email}"),
            Self::RecoveryPending { email } => {
                write!(f, "password reset pending for {email}")
            }
        }
    }
}

/// Tunables for the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Redirect target embedded in password-reset emails
    pub reset_redirect: String,
    /// Seconds a user must wait between reset-email requests
    pub reset_cooldown_secs: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            reset_redirect: DEFAULT_RESET_REDIRECT.to_string(),
            reset_cooldown_secs: DEFAULT_RESET_COOLDOWN_SECS,
        }
    }
}
