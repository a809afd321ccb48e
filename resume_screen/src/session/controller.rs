//! Authentication and password-recovery state machine.

use std::sync::Arc;
use tokio::sync::watch;

use super::cooldown::CooldownTimer;
use super::models::{SessionSettings, SessionState};
use crate::analysis::EligibilitySync;
use crate::errors::{ClientError, ClientResult};
use crate::notify::Notifier;
use crate::ports::{IdentityProvider, ProviderError, Session};

const CREDENTIALS_REQUIRED: &str = "Email and password required";
const SIGNUP_MISMATCH: &str = "Passwords must match";
const RESET_EMAIL_REQUIRED: &str = "Enter email first";
const NEW_PASSWORD_REQUIRED: &str = "Fill both fields";
const NEW_PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Puts the session into `Authenticating` for the length of one provider
/// call. Unless committed, dropping it restores the previous state, so a
/// failed or abandoned attempt never leaves a dangling "signing in".
struct AuthAttempt<'a> {
    state: &'a watch::Sender<SessionState>,
    fallback: Option<SessionState>,
}

impl<'a> AuthAttempt<'a> {
    fn begin(state: &'a watch::Sender<SessionState>) -> Self {
        let fallback = state.send_replace(SessionState::Authenticating);
        Self {
            state,
            fallback: Some(fallback),
        }
    }

    fn commit(mut self, next: SessionState) {
        self.fallback = None;
        self.state.send_replace(next);
    }
}

impl Drop for AuthAttempt<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.fallback.take() {
            self.state.send_replace(previous);
        }
    }
}

/// Drives the user's authentication journey against an identity provider
/// and decides which state the rest of the application presents.
///
/// Every failing operation leaves the state as it was, surfaces the error
/// to the caller and pushes an error notification.
pub struct SessionController {
    identity: Arc<dyn IdentityProvider>,
    eligibility: Arc<EligibilitySync>,
    notifier: Notifier,
    settings: SessionSettings,
    cooldown: CooldownTimer,
    state: watch::Sender<SessionState>,
    /// Set once a login or password update succeeded in this instance.
    /// Survives sign-out: the provider may still hold that session.
    signed_in_here: bool,
    /// Set by the first entry probe or any successful sign-in. Recovery is
    /// only ever detected on entry.
    entered: bool,
}

impl SessionController {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        eligibility: Arc<EligibilitySync>,
        notifier: Notifier,
        settings: SessionSettings,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            identity,
            eligibility,
            notifier,
            cooldown: CooldownTimer::new(settings.reset_cooldown_secs),
            settings,
            state,
            signed_in_here: false,
            entered: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Observe state transitions, including the transient `Authenticating`.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_email(&self) -> Option<String> {
        self.state.borrow().email().map(str::to_string)
    }

    /// Seconds until another reset email may be requested.
    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown.remaining()
    }

    /// Startup probe for the login entry point. A live session that this
    /// instance did not sign in is a recovery session from a reset link.
    /// Only the first entry probe consults the provider.
    pub async fn probe(&mut self) -> SessionState {
        if self.entered || self.state() != SessionState::Anonymous {
            return self.state();
        }
        self.entered = true;

        match self.lookup_session().await {
            Some(session) if !self.signed_in_here => {
                log::info!("recovery session detected for {}", session.email);
                self.state.send_replace(SessionState::RecoveryPending {
                    email: session.email,
                });
            }
            Some(session) => self.establish(session.email).await,
            None => {}
        }
        self.state()
    }

    /// Startup probe for the dashboard entry point: an existing session is
    /// resumed as authenticated, otherwise the user stays signed out.
    pub async fn restore(&mut self) -> SessionState {
        if self.entered || self.state() != SessionState::Anonymous {
            return self.state();
        }
        self.entered = true;

        if let Some(session) = self.lookup_session().await {
            self.signed_in_here = true;
            self.establish(session.email).await;
        }
        self.state()
    }

    /// Sign in with email and password. On success the initial eligible
    /// history fetch is issued before returning.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<()> {
        self.require_anonymous()?;
        self.require_credentials(email, password)?;

        let attempt = AuthAttempt::begin(&self.state);
        let session = match self.identity.sign_in_with_password(email, password).await {
            Ok(session) => session,
            Err(err) => {
                drop(attempt);
                return Err(self.reject(err));
            }
        };

        let email = if session.email.is_empty() {
            email.to_string()
        } else {
            session.email
        };

        self.signed_in_here = true;
        self.entered = true;
        attempt.commit(SessionState::Authenticated {
            email: email.clone(),
        });
        log::info!("signed in as {email}");
        self.notifier.success("Signed in");
        self.eligibility.refresh(&email).await;
        Ok(())
    }

    /// Register a new account. Signup needs out-of-band email confirmation,
    /// so the user returns to `Anonymous` either way.
    pub async fn sign_up(&mut self, email: &str, password: &str, confirm: &str) -> ClientResult<()> {
        self.require_anonymous()?;
        self.require_credentials(email, password)?;
        if password != confirm {
            return Err(self.invalid(SIGNUP_MISMATCH));
        }

        let attempt = AuthAttempt::begin(&self.state);
        let outcome = self.identity.sign_up(email, password).await;
        drop(attempt);

        match outcome {
            Ok(()) => {
                log::info!("signup submitted for {email}, awaiting confirmation");
                self.notifier.success("Signup successful! Check email.");
                Ok(())
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Ask the provider to email a reset link. Rejected locally while the
    /// cooldown from the previous request is still running.
    pub async fn request_password_reset(&mut self, email: &str) -> ClientResult<()> {
        self.require_anonymous()?;

        let remaining_secs = self.cooldown.remaining();
        if remaining_secs > 0 {
            let err = ClientError::CooldownActive { remaining_secs };
            self.notifier.error(err.to_string());
            return Err(err);
        }

        if email.trim().is_empty() {
            return Err(self.invalid(RESET_EMAIL_REQUIRED));
        }

        self.identity
            .reset_password_for_email(email, &self.settings.reset_redirect)
            .await
            .map_err(|err| self.reject(err))?;

        self.cooldown.start();
        log::info!("reset email requested for {email}");
        self.notifier.success("Reset email sent!");
        Ok(())
    }

    /// Complete a recovery by setting a new password.
    pub async fn update_password(&mut self, password: &str, confirm: &str) -> ClientResult<()> {
        let email = match self.state() {
            SessionState::RecoveryPending { email } => email,
            other => return Err(self.not_permitted(&other)),
        };

        if password.is_empty() || confirm.is_empty() {
            return Err(self.invalid(NEW_PASSWORD_REQUIRED));
        }
        if password != confirm {
            return Err(self.invalid(NEW_PASSWORD_MISMATCH));
        }

        self.identity
            .update_password(password)
            .await
            .map_err(|err| self.reject(err))?;

        self.signed_in_here = true;
        self.entered = true;
        self.notifier.success("Password updated successfully!");
        self.establish(email).await;
        Ok(())
    }

    /// Sign out. Local state is cleared first and the remote call is best
    /// effort, so this always succeeds once the user is signed in.
    pub async fn sign_out(&mut self) -> ClientResult<()> {
        let email = match self.state() {
            SessionState::Authenticated { email } => email,
            other => return Err(self.not_permitted(&other)),
        };

        self.state.send_replace(SessionState::Anonymous);
        self.eligibility.clear().await;

        if let Err(err) = self.identity.sign_out().await {
            log::warn!("remote sign-out failed for {email}: {err}");
        }

        log::info!("signed out {email}");
        self.notifier.info("Signed out");
        Ok(())
    }

    /// Stop background work owned by the controller.
    pub fn teardown(&mut self) {
        self.cooldown.cancel();
    }

    async fn lookup_session(&self) -> Option<Session> {
        match self.identity.get_session().await {
            Ok(Some(session)) if !session.email.is_empty() => Some(session),
            Ok(Some(_)) => {
                log::warn!("ignoring session without an email");
                None
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!("session lookup failed: {err}");
                None
            }
        }
    }

    async fn establish(&mut self, email: String) {
        self.state.send_replace(SessionState::Authenticated {
            email: email.clone(),
        });
        self.eligibility.refresh(&email).await;
    }

    fn require_anonymous(&self) -> ClientResult<()> {
        let state = self.state();
        if state == SessionState::Anonymous {
            Ok(())
        } else {
            Err(self.not_permitted(&state))
        }
    }

    fn require_credentials(&self, email: &str, password: &str) -> ClientResult<()> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(self.invalid(CREDENTIALS_REQUIRED));
        }
        Ok(())
    }

    fn invalid(&self, message: &str) -> ClientError {
        self.notifier.error(message);
        ClientError::validation(message)
    }

    fn not_permitted(&self, state: &SessionState) -> ClientError {
        let err = ClientError::NotPermitted(state.label());
        self.notifier.error(err.to_string());
        err
    }

    fn reject(&self, err: ProviderError) -> ClientError {
        log::debug!("identity provider rejected request: {err}");
        self.notifier.error(err.message.clone());
        err.into()
    }
}
