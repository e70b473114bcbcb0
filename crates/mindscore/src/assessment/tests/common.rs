use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response as HttpResponse;
use serde_json::Value;

use crate::assessment::catalog;
use crate::assessment::domain::{AssessmentId, AssessmentRecord, DimensionId, Response, SubmissionId};
use crate::assessment::normative::{
    InMemoryNormativeStore, NormativeRecord, NormativeStore, NormativeStoreError,
};
use crate::assessment::repository::{RepositoryError, ResultRepository};
use crate::assessment::{
    assessment_router, AssessmentDefinition, AssessmentRegistry, AssessmentRouterState,
    AssessmentService, DemographicGroup,
};
use crate::narrative::{NarrativeCache, ResilientNarrator, RetryPolicy, UnconfiguredGenerator};

pub(super) fn resilience() -> AssessmentDefinition {
    catalog::stress_resilience()
}

pub(super) fn faith() -> AssessmentDefinition {
    catalog::faith_values()
}

pub(super) fn answer(question_id: &str, selected_option: usize, response_time_ms: u64) -> Response {
    Response {
        question_id: question_id.to_string(),
        selected_option,
        response_time_ms,
        confidence: None,
    }
}

/// One response per question, all selecting the same option.
pub(super) fn uniform(
    definition: &AssessmentDefinition,
    selected_option: usize,
    response_time_ms: u64,
) -> Vec<Response> {
    definition
        .questions
        .iter()
        .map(|question| answer(&question.id, selected_option, response_time_ms))
        .collect()
}

/// Cycles through every option so no position slot dominates.
pub(super) fn varied(definition: &AssessmentDefinition, response_time_ms: u64) -> Vec<Response> {
    definition
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| answer(&question.id, index % question.options.len(), response_time_ms))
        .collect()
}

pub(super) fn norm(
    assessment: &str,
    dimension: &str,
    group: DemographicGroup,
    sample_size: u32,
) -> NormativeRecord {
    NormativeRecord {
        assessment: AssessmentId::new(assessment),
        dimension: DimensionId::new(dimension),
        group,
        sample_size,
        mean: 60.0,
        std_dev: 12.0,
        p25: 52.0,
        p50: 60.0,
        p75: 68.0,
        p90: 76.0,
    }
}

pub(super) fn age_group(value: &str) -> DemographicGroup {
    DemographicGroup {
        age_group: Some(value.to_string()),
        ..DemographicGroup::default()
    }
}

pub(super) fn norm_store(records: Vec<NormativeRecord>) -> Arc<InMemoryNormativeStore> {
    Arc::new(InMemoryNormativeStore::new(records))
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryRepository, InMemoryNormativeStore>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AssessmentService::new(
        Arc::new(AssessmentRegistry::builtin()),
        repository.clone(),
        norm_store(Vec::new()),
    );
    (service, repository)
}

pub(super) fn offline_narrator() -> Arc<ResilientNarrator> {
    Arc::new(ResilientNarrator::new(
        Arc::new(UnconfiguredGenerator),
        Arc::new(NarrativeCache::new(std::time::Duration::from_secs(60))),
        RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        },
    ))
}

pub(super) fn router_with<R, S>(service: AssessmentService<R, S>, static_fallback: bool) -> axum::Router
where
    R: ResultRepository + 'static,
    S: NormativeStore + 'static,
{
    assessment_router(AssessmentRouterState {
        service: Arc::new(service),
        narrator: offline_narrator(),
        static_fallback,
    })
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<SubmissionId, AssessmentRecord>>>,
}

impl ResultRepository for MemoryRepository {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.submission_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.submission_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(
        &self,
        assessment: &AssessmentId,
        limit: usize,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<AssessmentRecord> = guard
            .values()
            .filter(|record| &record.result.assessment == assessment)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        records.truncate(limit);
        Ok(records)
    }
}

pub(super) struct ConflictRepository;

impl ResultRepository for ConflictRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(None)
    }

    fn recent(
        &self,
        _assessment: &AssessmentId,
        _limit: usize,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl ResultRepository for UnavailableRepository {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(
        &self,
        _assessment: &AssessmentId,
        _limit: usize,
    ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Store that fails every lookup.
pub(super) struct OfflineNormativeStore;

impl NormativeStore for OfflineNormativeStore {
    fn records(
        &self,
        _assessment: &AssessmentId,
        _dimension: &DimensionId,
    ) -> Result<Vec<NormativeRecord>, NormativeStoreError> {
        Err(NormativeStoreError::Unavailable("norms offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: HttpResponse) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
