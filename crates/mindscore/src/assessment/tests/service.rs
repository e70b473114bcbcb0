use std::sync::Arc;

use super::common::*;
use crate::assessment::catalog::{FAITH_VALUES, STRESS_RESILIENCE};
use crate::assessment::domain::{AssessmentId, DimensionId, SubmissionId};
use crate::assessment::repository::RepositoryError;
use crate::assessment::{
    AssessmentRegistry, AssessmentService, AssessmentServiceError, DemographicGroup,
    SubmissionRequest, ValidityLabel,
};

fn request(selected_option: usize) -> SubmissionRequest {
    let definition = resilience();
    SubmissionRequest {
        responses: uniform(&definition, selected_option, 9_000),
        demographics: age_group("25-34"),
    }
}

#[test]
fn submit_scores_and_persists_records() {
    let (service, repository) = build_service();

    let record = service
        .submit(&AssessmentId::new(STRESS_RESILIENCE), request(2))
        .expect("submission succeeds");

    assert!(record.submission_id.0.starts_with("sub-"));
    assert_eq!(record.result.profile, "Stone");
    assert_eq!(record.responses.len(), 12);
    assert_eq!(record.demographics, age_group("25-34"));

    let stored = repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .get(&record.submission_id)
        .cloned()
        .expect("record stored");
    assert_eq!(stored, record);
}

#[test]
fn submission_ids_are_unique() {
    let (service, _) = build_service();
    let assessment = AssessmentId::new(STRESS_RESILIENCE);

    let first = service.submit(&assessment, request(1)).expect("first");
    let second = service.submit(&assessment, request(3)).expect("second");

    assert_ne!(first.submission_id, second.submission_id);
}

#[test]
fn submit_rejects_unknown_assessment() {
    let (service, repository) = build_service();

    let error = service
        .submit(&AssessmentId::new("enneagram"), request(2))
        .expect_err("unknown assessment");

    assert!(matches!(error, AssessmentServiceError::UnknownAssessment(id) if id.as_str() == "enneagram"));
    assert!(repository.records.lock().expect("lock").is_empty());
}

#[test]
fn submit_surfaces_repository_conflicts() {
    let service = AssessmentService::new(
        Arc::new(AssessmentRegistry::builtin()),
        Arc::new(ConflictRepository),
        norm_store(Vec::new()),
    );

    let error = service
        .submit(&AssessmentId::new(STRESS_RESILIENCE), request(2))
        .expect_err("conflict");

    assert!(matches!(
        error,
        AssessmentServiceError::Repository(RepositoryError::Conflict)
    ));
}

#[test]
fn get_returns_stored_record_or_not_found() {
    let (service, _) = build_service();
    let record = service
        .submit(&AssessmentId::new(STRESS_RESILIENCE), request(4))
        .expect("submission succeeds");

    let fetched = service.get(&record.submission_id).expect("record found");
    assert_eq!(fetched, record);

    let missing = service
        .get(&SubmissionId("sub-999999".to_string()))
        .expect_err("missing");
    assert!(matches!(
        missing,
        AssessmentServiceError::Repository(RepositoryError::NotFound)
    ));
}

#[test]
fn recent_filters_by_assessment() {
    let (service, _) = build_service();
    let resilience_id = AssessmentId::new(STRESS_RESILIENCE);
    let faith_id = AssessmentId::new(FAITH_VALUES);

    service.submit(&resilience_id, request(1)).expect("first");
    service.submit(&resilience_id, request(2)).expect("second");
    service
        .submit(
            &faith_id,
            SubmissionRequest {
                responses: uniform(&faith(), 2, 9_000),
                demographics: DemographicGroup::default(),
            },
        )
        .expect("faith");

    let recent = service.recent(&resilience_id, 10).expect("recent");
    assert_eq!(recent.len(), 2);
    assert!(recent
        .iter()
        .all(|record| record.result.assessment == resilience_id));

    assert_eq!(service.recent(&resilience_id, 1).expect("limited").len(), 1);
    assert!(service.recent(&AssessmentId::new("enneagram"), 5).is_err());
}

#[test]
fn compare_never_fails_without_norms() {
    let (service, _) = build_service();

    let comparison = service.compare(
        &AssessmentId::new(STRESS_RESILIENCE),
        &DimensionId::new("social"),
        45.0,
        &DemographicGroup::default(),
    );

    assert!(!comparison.data_available);
    assert_eq!(comparison.percentile, 50);
}

#[test]
fn summary_view_rounds_the_overall_score() {
    let (service, _) = build_service();
    let definition = resilience();
    let responses = varied(&definition, 9_000);

    let record = service
        .submit(
            &AssessmentId::new(STRESS_RESILIENCE),
            SubmissionRequest {
                responses,
                demographics: DemographicGroup::default(),
            },
        )
        .expect("submission succeeds");
    let view = record.summary_view();

    assert_eq!(view.submission_id, record.submission_id);
    assert_eq!(view.response_count, 12);
    assert_eq!(view.validity, ValidityLabel::High);
    assert!((view.overall_score * 10.0 - (view.overall_score * 10.0).round()).abs() < 1e-9);
}
