//! Single-flight coordination of analyze requests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::eligibility::EligibilitySync;
use super::models::{AnalysisRequest, AnalysisResult, ResumeFile};
use super::shape;
use crate::errors::{ClientError, ClientResult};
use crate::notify::Notifier;
use crate::ports::ScoringService;

const MISSING_INPUT: &str = "Please enter job description and upload PDF resumes";

/// Holds the in-flight flag for the duration of one submission and clears
/// it on every exit path, including early returns and cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the displayed result set and guarantees at most one analyze request
/// is outstanding.
pub struct AnalysisCoordinator {
    scoring: Arc<dyn ScoringService>,
    eligibility: Arc<EligibilitySync>,
    notifier: Notifier,
    in_flight: AtomicBool,
    results: RwLock<Vec<AnalysisResult>>,
}

impl AnalysisCoordinator {
    pub fn new(
        scoring: Arc<dyn ScoringService>,
        eligibility: Arc<EligibilitySync>,
        notifier: Notifier,
    ) -> Self {
        Self {
            scoring,
            eligibility,
            notifier,
            in_flight: AtomicBool::new(false),
            results: RwLock::new(Vec::new()),
        }
    }

    /// Submit a job description and résumés for scoring.
    ///
    /// On success the displayed result set is replaced with the service's
    /// results and the eligible history is refreshed afterwards. On failure
    /// the previous result set is left as it was.
    ///
    /// # Errors
    ///
    /// * [`ClientError::Validation`] - empty job description or no files
    /// * [`ClientError::InFlight`] - another submission is outstanding
    /// * [`ClientError::BackendUnavailable`] - no response from the service
    /// * [`ClientError::BackendError`] - the service answered with a failure
    pub async fn submit(
        &self,
        job_description: &str,
        files: &[ResumeFile],
        user_email: &str,
    ) -> ClientResult<Vec<AnalysisResult>> {
        if job_description.trim().is_empty() || files.is_empty() {
            self.notifier.error(MISSING_INPUT);
            return Err(ClientError::validation(MISSING_INPUT));
        }

        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            log::debug!("analyze ignored, a submission is already in flight");
            return Err(ClientError::InFlight);
        };

        let request = AnalysisRequest {
            job_description: job_description.to_string(),
            hr_email: user_email.to_string(),
            files: files.to_vec(),
        };

        log::info!(
            "submitting {} resume(s) for analysis as {user_email}",
            request.files.len()
        );

        let body = match self.scoring.analyze(&request).await {
            Ok(body) => body,
            Err(err) => {
                drop(guard);
                log::warn!("analysis failed: {err}");
                let err = ClientError::from(err);
                self.notifier.error(err.to_string());
                return Err(err);
            }
        };

        let results = shape::analysis_results(&body);
        *self.results.write().await = results.clone();
        drop(guard);

        let eligible = results.iter().filter(|r| r.is_eligible()).count();
        self.notifier.success(format!(
            "Analyzed {} resume(s), {eligible} eligible",
            results.len()
        ));

        // Issued only once the response is fully applied.
        self.eligibility.refresh(user_email).await;

        Ok(results)
    }

    /// The displayed result set from the last successful analysis.
    pub async fn results(&self) -> Vec<AnalysisResult> {
        self.results.read().await.clone()
    }

    /// True while a submission is outstanding; views disable the trigger.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn clear(&self) {
        self.results.write().await.clear();
    }
}
