//! Session module: the authentication/recovery state machine and the
//! password-reset cooldown.
//!
//! ## States
//!
//! - **Anonymous**: no session; login, signup and reset requests allowed
//! - **Authenticating**: a login or signup call is outstanding
//! - **Authenticated**: signed in; analysis is available
//! - **RecoveryPending**: entered only at startup from a reset link; the
//!   only permitted action is setting a new password
//!
//! ## Example
//!
//! ```no_run
//! use resume_screen::analysis::EligibilitySync;
//! use resume_screen::notify;
//! use resume_screen::ports::{IdentityProvider, ScoringService};
//! use resume_screen::session::{SessionController, SessionSettings};
//! use std::sync::Arc;
//!
//! async fn sign_in(identity: Arc<dyn IdentityProvider>, scoring: Arc<dyn ScoringService>) {
//!     let (notifier, _notices) = notify::channel();
//!     let eligibility = Arc::new(EligibilitySync::new(scoring));
//!     let mut session =
//!         SessionController::new(identity, eligibility, notifier, SessionSettings::default());
//!
//!     session.probe().await;
//!     if session.login("hr@example.com", "hunter22").await.is_ok() {
//!         println!("{}", session.state());
//!     }
//! }
//! ```

pub mod controller;
pub mod cooldown;
pub mod models;

pub use controller::SessionController;
pub use cooldown::{CooldownTimer, DEFAULT_RESET_COOLDOWN_SECS};
pub use models::{DEFAULT_RESET_REDIRECT, SessionSettings, SessionState};
