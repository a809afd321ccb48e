//! Analysis data models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The only media type the scoring service accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A file as picked by the user, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    /// Media type declared by whatever picked the file
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// A résumé that passed selection. Only constructible from a PDF selection,
/// so every file reaching the coordinator is already of the accepted type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    name: String,
    bytes: Vec<u8>,
}

impl ResumeFile {
    /// Accept a selection if its declared media type is PDF.
    pub fn from_selected(file: SelectedFile) -> Option<Self> {
        if file.media_type.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            Some(Self {
                name: file.name,
                bytes: file.bytes,
            })
        } else {
            None
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &'static str {
        PDF_MEDIA_TYPE
    }
}

/// Filter a user's selection down to PDFs, preserving order. Anything else
/// is dropped here, at selection time.
pub fn select_pdfs(selection: impl IntoIterator<Item = SelectedFile>) -> Vec<ResumeFile> {
    selection
        .into_iter()
        .filter_map(|file| {
            let name = file.name.clone();
            let media_type = file.media_type.clone();
            let accepted = ResumeFile::from_selected(file);
            if accepted.is_none() {
                log::debug!("dropping {name} from selection: {media_type} is not a PDF");
            }
            accepted
        })
        .collect()
}

/// Outbound payload for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub job_description: String,
    /// Email of the account the eligible matches are filed under
    pub hr_email: String,
    pub files: Vec<ResumeFile>,
}

/// Per-résumé verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Eligible,
    NotEligible,
}

impl Verdict {
    /// Parse the service's status string. The service writes
    /// `"NOT ELIGIBLE"` with a space; unknown strings count as not eligible.
    pub fn from_wire(status: &str) -> Self {
        if status.trim().eq_ignore_ascii_case("ELIGIBLE") {
            Self::Eligible
        } else {
            Self::NotEligible
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eligible => write!(f, "ELIGIBLE"),
            Self::NotEligible => write!(f, "NOT ELIGIBLE"),
        }
    }
}

/// Verdict for one submitted résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub resume_name: String,
    pub status: Verdict,
    /// Empty unless `status` is [`Verdict::Eligible`]
    pub matched_skills: BTreeSet<String>,
    /// Percentage in `[0, 100]`
    pub match_score: f64,
    /// Public link to the stored résumé, set for eligible results
    pub file_url: Option<String>,
}

impl AnalysisResult {
    pub fn is_eligible(&self) -> bool {
        self.status == Verdict::Eligible
    }
}

/// Opaque identifier of a history row. The service uses integers today but
/// nothing in the client depends on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HistoryId(pub String);

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One accumulated eligible match for the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleHistoryItem {
    pub id: HistoryId,
    pub resume_name: String,
    pub match_score: f64,
    pub file_url: Option<String>,
    pub created_at: Option<String>,
}
