//! In-memory identity provider and scoring service used by the integration
//! tests, plus a harness wiring them into the controllers.

#![allow(dead_code)]

use async_trait::async_trait;
use resume_screen::analysis::{AnalysisCoordinator, AnalysisRequest, EligibilitySync, SelectedFile};
use resume_screen::notify::{self, Notification};
use resume_screen::ports::{
    IdentityProvider, ProviderError, ProviderResult, ScoringError, ScoringResult, ScoringService,
    Session,
};
use resume_screen::session::{SessionController, SessionSettings};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

// ============================================================================
// Identity provider
// ============================================================================

#[derive(Default)]
pub struct FakeIdentity {
    session: Mutex<Option<Session>>,
    failures: Mutex<HashMap<&'static str, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn with_session(email: &str) -> Self {
        let fake = Self::default();
        *fake.session.lock().unwrap() = Some(Session::new(email));
        fake
    }

    /// Make every call to `operation` fail with `message`.
    pub fn fail(&self, operation: &'static str, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(operation))
            .count()
    }

    fn record(&self, call: String) -> ProviderResult<()> {
        let operation = call.split(':').next().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(operation.as_str()) {
            Some(message) => Err(ProviderError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(&self, email: &str, _password: &str) -> ProviderResult<()> {
        self.record(format!("sign_up:{email}"))
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> ProviderResult<Session> {
        self.record(format!("sign_in:{email}"))?;
        let session = Session::new(email);
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn get_session(&self) -> ProviderResult<Option<Session>> {
        self.record("get_session".to_string())?;
        Ok(self.session.lock().unwrap().clone())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> ProviderResult<()> {
        self.record(format!("reset:{email}:{redirect_to}"))
    }

    async fn update_password(&self, _password: &str) -> ProviderResult<()> {
        self.record("update_password".to_string())
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        // A failed remote sign-out leaves the provider's session in place.
        self.record("sign_out".to_string())?;
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

// ============================================================================
// Scoring service
// ============================================================================

pub struct FakeScoring {
    analyze_responses: Mutex<VecDeque<ScoringResult<Value>>>,
    eligible_response: Mutex<ScoringResult<Value>>,
    analyze_delay: Duration,
    /// Ordered log of every call, e.g. `analyze:2` or `eligible:hr@x.com`
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<AnalysisRequest>>,
}

impl Default for FakeScoring {
    fn default() -> Self {
        Self {
            analyze_responses: Mutex::new(VecDeque::new()),
            eligible_response: Mutex::new(Ok(json!({"eligible_resumes": []}))),
            analyze_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl FakeScoring {
    pub fn slow(delay: Duration) -> Self {
        Self {
            analyze_delay: delay,
            ..Self::default()
        }
    }

    pub fn queue_analyze(&self, response: ScoringResult<Value>) {
        self.analyze_responses.lock().unwrap().push_back(response);
    }

    pub fn set_eligible(&self, response: ScoringResult<Value>) {
        *self.eligible_response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn analyze_count(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("analyze")).count()
    }

    pub fn eligible_count(&self) -> usize {
        self.calls().iter().filter(|c| c.starts_with("eligible")).count()
    }

    pub fn last_request(&self) -> Option<AnalysisRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ScoringService for FakeScoring {
    async fn analyze(&self, request: &AnalysisRequest) -> ScoringResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("analyze:{}", request.files.len()));
        self.requests.lock().unwrap().push(request.clone());

        if !self.analyze_delay.is_zero() {
            tokio::time::sleep(self.analyze_delay).await;
        }

        self.analyze_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ScoringError::Unavailable("no canned response".into())))
    }

    async fn eligible(&self, email: &str) -> ScoringResult<Value> {
        self.calls.lock().unwrap().push(format!("eligible:{email}"));
        self.eligible_response.lock().unwrap().clone()
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub identity: Arc<FakeIdentity>,
    pub scoring: Arc<FakeScoring>,
    pub eligibility: Arc<EligibilitySync>,
    pub session: SessionController,
    pub analysis: AnalysisCoordinator,
    pub notices: UnboundedReceiver<Notification>,
}

impl Harness {
    pub fn new(identity: FakeIdentity, scoring: FakeScoring) -> Self {
        Self::with_settings(identity, scoring, SessionSettings::default())
    }

    pub fn with_settings(
        identity: FakeIdentity,
        scoring: FakeScoring,
        settings: SessionSettings,
    ) -> Self {
        let identity = Arc::new(identity);
        let scoring = Arc::new(scoring);
        let (notifier, notices) = notify::channel();
        let eligibility = Arc::new(EligibilitySync::new(scoring.clone()));
        let session = SessionController::new(
            identity.clone(),
            eligibility.clone(),
            notifier.clone(),
            settings,
        );
        let analysis = AnalysisCoordinator::new(scoring.clone(), eligibility.clone(), notifier);

        Self {
            identity,
            scoring,
            eligibility,
            session,
            analysis,
            notices,
        }
    }

    pub fn drain_notices(&mut self) -> Vec<Notification> {
        let mut drained = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            drained.push(notice);
        }
        drained
    }
}

pub fn pdf(name: &str) -> SelectedFile {
    SelectedFile::new(name, "application/pdf", b"%PDF-1.4 test".to_vec())
}
