//! # Resume Screen
//!
//! Session and request orchestration for a résumé screening client.
//!
//! The crate sits between a view and two external services: an identity
//! provider that owns the user's session, and a scoring service that rates
//! résumés against a job description. It owns the only stateful logic of
//! the client:
//!
//! - [`session`]: the authentication/recovery state machine and the
//!   password-reset cooldown
//! - [`analysis`]: single-flight analyze requests, eligible-history sync and
//!   normalization of the service's loosely shaped responses
//! - [`notify`]: transient notices for the view
//! - [`ports`]: the traits the external services are reached through
//!
//! Every failure is terminal at the component that produced it: the caller
//! gets a [`ClientError`], the view gets a notification, and the triggering
//! state reverts to what it was before the call.

/// Analysis requests, results and eligible history.
pub mod analysis;
pub use analysis::{AnalysisCoordinator, AnalysisResult, EligibilitySync, EligibleHistoryItem};

pub mod errors;
pub use errors::{ClientError, ClientResult};

pub mod notify;
pub use notify::{Notification, Notifier};

/// External service contracts.
pub mod ports;
pub use ports::{IdentityProvider, ScoringService};

/// Authentication state machine.
pub mod session;
pub use session::{SessionController, SessionState};
