use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{AssessmentId, AssessmentRecord, SubmissionId};
use super::validity::ValidityLabel;

impl AssessmentRecord {
    pub fn summary_view(&self) -> SubmissionSummaryView {
        SubmissionSummaryView {
            submission_id: self.submission_id.clone(),
            assessment: self.result.assessment.clone(),
            submitted_at: self.submitted_at,
            overall_score: (self.result.overall_score * 10.0).round() / 10.0,
            profile: self.result.profile.clone(),
            percentile: self.result.percentile,
            validity: self.result.validity.label,
            response_count: self.responses.len(),
        }
    }
}

/// Storage abstraction for scored submissions. Scoring never writes here; the
/// service persists results after evaluation.
pub trait ResultRepository: Send + Sync {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn recent(
        &self,
        assessment: &AssessmentId,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Compact listing of a stored submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionSummaryView {
    pub submission_id: SubmissionId,
    pub assessment: AssessmentId,
    pub submitted_at: DateTime<Utc>,
    pub overall_score: f64,
    pub profile: String,
    pub percentile: u8,
    pub validity: ValidityLabel,
    pub response_count: usize,
}
