//! Résumé analysis: request coordination and eligible-history sync.
//!
//! - [`AnalysisCoordinator`] accepts one submission at a time, sends it to
//!   the scoring service and replaces the displayed result set on success.
//! - [`EligibilitySync`] mirrors the user's accumulated eligible matches and
//!   is refreshed after every successful analysis.
//! - [`shape`] turns the service's loosely shaped JSON into typed models.

pub mod coordinator;
pub mod eligibility;
pub mod models;
pub mod shape;

pub use coordinator::AnalysisCoordinator;
pub use eligibility::EligibilitySync;
pub use models::{
    AnalysisRequest, AnalysisResult, EligibleHistoryItem, HistoryId, PDF_MEDIA_TYPE, ResumeFile,
    SelectedFile, Verdict, select_pdfs,
};
