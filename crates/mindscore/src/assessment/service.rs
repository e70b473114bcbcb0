use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::definition::AssessmentDefinition;
use super::domain::{
    AssessmentId, AssessmentRecord, DemographicGroup, DimensionId, Response, SubmissionId,
};
use super::engine::AssessmentEngine;
use super::normative::{NormativeComparator, NormativeComparison, NormativeStore};
use super::registry::AssessmentRegistry;
use super::repository::{RepositoryError, ResultRepository};

/// Inbound payload for scoring one assessment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub responses: Vec<Response>,
    #[serde(default)]
    pub demographics: DemographicGroup,
}

/// Service composing the registry, scoring engine and result repository.
pub struct AssessmentService<R, S> {
    registry: Arc<AssessmentRegistry>,
    repository: Arc<R>,
    engine: Arc<AssessmentEngine<S>>,
}

static SUBMISSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_submission_id() -> SubmissionId {
    let id = SUBMISSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SubmissionId(format!("sub-{id:06}"))
}

impl<R, S> AssessmentService<R, S>
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    pub fn new(registry: Arc<AssessmentRegistry>, repository: Arc<R>, norms: Arc<S>) -> Self {
        let engine = Arc::new(AssessmentEngine::new(NormativeComparator::new(norms)));
        Self {
            registry,
            repository,
            engine,
        }
    }

    pub fn registry(&self) -> &AssessmentRegistry {
        &self.registry
    }

    pub fn definition(
        &self,
        assessment: &AssessmentId,
    ) -> Result<Arc<AssessmentDefinition>, AssessmentServiceError> {
        self.registry
            .get(assessment)
            .ok_or_else(|| AssessmentServiceError::UnknownAssessment(assessment.clone()))
    }

    /// Score a response set and persist the resulting record.
    pub fn submit(
        &self,
        assessment: &AssessmentId,
        request: SubmissionRequest,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let definition = self.definition(assessment)?;
        let result = self
            .engine
            .evaluate(&definition, &request.responses, &request.demographics);

        let record = AssessmentRecord {
            submission_id: next_submission_id(),
            submitted_at: Utc::now(),
            demographics: request.demographics,
            responses: request.responses,
            result,
        };

        let stored = self.repository.insert(record)?;
        info!(
            submission = %stored.submission_id.0,
            assessment = %assessment,
            overall_score = stored.result.overall_score,
            profile = %stored.result.profile,
            "submission scored"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &SubmissionId) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn recent(
        &self,
        assessment: &AssessmentId,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        self.definition(assessment)?;
        Ok(self.repository.recent(assessment, limit)?)
    }

    /// Direct normative comparison; never fails.
    pub fn compare(
        &self,
        assessment: &AssessmentId,
        dimension: &DimensionId,
        score: f64,
        demographics: &DemographicGroup,
    ) -> NormativeComparison {
        self.engine
            .comparator()
            .compare(assessment, dimension, score, demographics)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error("unknown assessment: {0}")]
    UnknownAssessment(AssessmentId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
