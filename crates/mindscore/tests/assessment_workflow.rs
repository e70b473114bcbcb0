//! End-to-end scoring scenarios driven through the public engine, service and
//! narrator APIs.

mod common {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use mindscore::assessment::{
        AssessmentDefinition, AssessmentId, AssessmentRecord, DimensionId, NormativeRecord,
        NormativeStore, NormativeStoreError, RepositoryError, Response, ResultRepository,
        SubmissionId,
    };

    pub(super) fn uniform(
        definition: &AssessmentDefinition,
        selected_option: usize,
        response_time_ms: u64,
    ) -> Vec<Response> {
        definition
            .questions
            .iter()
            .map(|question| Response {
                question_id: question.id.clone(),
                selected_option,
                response_time_ms,
                confidence: Some(4),
            })
            .collect()
    }

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        records: Mutex<HashMap<SubmissionId, AssessmentRecord>>,
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
            Ok(self
                .records
                .lock()
                .expect("repository mutex poisoned")
                .get(id)
                .cloned())
        }

        fn recent(
            &self,
            assessment: &AssessmentId,
            limit: usize,
        ) -> Result<Vec<AssessmentRecord>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("repository mutex poisoned")
                .values()
                .filter(|record| &record.result.assessment == assessment)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    pub(super) struct BrokenNorms;

    impl NormativeStore for BrokenNorms {
        fn records(
            &self,
            _assessment: &AssessmentId,
            _dimension: &DimensionId,
        ) -> Result<Vec<NormativeRecord>, NormativeStoreError> {
            Err(NormativeStoreError::Unavailable(
                "connection refused".to_string(),
            ))
        }
    }
}

use std::sync::Arc;

use common::*;
use mindscore::assessment::catalog::{self, STRESS_RESILIENCE};
use mindscore::assessment::{
    AssessmentEngine, AssessmentId, AssessmentRegistry, AssessmentService, DemographicGroup,
    DimensionId, InMemoryNormativeStore, Interpretation, NormativeComparator, NormativeTable,
    SubmissionRequest, ValidityLabel,
};
use mindscore::narrative::{
    prompt, NarrativeCache, NarrativeSource, ResilientNarrator, RetryPolicy,
    UnconfiguredGenerator,
};

#[test]
fn maximal_answers_reach_the_top_profile_with_a_validity_warning() {
    let definition = catalog::stress_resilience();
    let engine = AssessmentEngine::new(NormativeComparator::new(Arc::new(
        InMemoryNormativeStore::default(),
    )));

    let result = engine.evaluate(
        &definition,
        &uniform(&definition, 4, 3_000),
        &DemographicGroup::default(),
    );

    assert!(result
        .dimension_scores
        .iter()
        .all(|score| (score.percentage - 100.0).abs() < 1e-9));
    assert!((result.overall_score - 100.0).abs() < 1e-9);
    assert_eq!(result.profile, "Diamond");
    assert!(result.validity.distortion_score >= 15);
    assert_ne!(result.validity.label, ValidityLabel::High);
    assert_eq!(result.challenges, Vec::<DimensionId>::new());
    assert_eq!(result.strengths.len(), definition.dimensions.len());
}

#[test]
fn minimal_answers_collect_every_recommendation() {
    let definition = catalog::stress_resilience();
    let engine = AssessmentEngine::new(NormativeComparator::new(Arc::new(
        InMemoryNormativeStore::default(),
    )));

    let result = engine.evaluate(
        &definition,
        &uniform(&definition, 0, 12_000),
        &DemographicGroup::default(),
    );

    assert!(result
        .dimension_scores
        .iter()
        .all(|score| (score.percentage - 20.0).abs() < 1e-9));
    assert_eq!(result.profile, "Clay");
    for dimension in &definition.dimensions {
        assert!(result
            .recommendations
            .contains(&dimension.low_score_recommendation));
    }
    for message in &definition.recommendations.tiers[0].messages {
        assert!(result.recommendations.contains(message));
    }
    assert_eq!(result.challenges.len(), definition.dimensions.len());
}

#[test]
fn broken_norm_store_degrades_to_defaults() {
    let definition = catalog::faith_values();
    let engine = AssessmentEngine::new(NormativeComparator::new(Arc::new(BrokenNorms)));

    let result = engine.evaluate(
        &definition,
        &uniform(&definition, 3, 12_000),
        &DemographicGroup {
            age_group: Some("35-44".to_string()),
            ..DemographicGroup::default()
        },
    );

    assert_eq!(result.percentile, 50);
    assert!(!result.normative.data_available);
    assert_eq!(result.normative.sample_size, 0);
    assert_eq!(result.normative.interpretation, Interpretation::AboveAverage);
    assert!(result
        .dimension_norms
        .values()
        .all(|comparison| !comparison.data_available));
}

#[test]
fn imported_norms_place_the_respondent() {
    let table = "\
assessment,dimension,age_group,gender,region,occupation,sample_size,mean,std_dev,p25,p50,p75,p90
stress_resilience,overall,,,,,2400,60,12,52,60,68,76
stress_resilience,overall,25-34,,,,600,70,10,62,70,78,85
";
    let store = Arc::new(InMemoryNormativeStore::new(
        NormativeTable::from_reader(table.as_bytes()).expect("table parses"),
    ));
    let engine = AssessmentEngine::new(NormativeComparator::new(store));
    let definition = catalog::stress_resilience();

    let general = engine.evaluate(
        &definition,
        &uniform(&definition, 2, 12_000),
        &DemographicGroup::default(),
    );
    let peers = engine.evaluate(
        &definition,
        &uniform(&definition, 2, 12_000),
        &DemographicGroup {
            age_group: Some("25-34".to_string()),
            ..DemographicGroup::default()
        },
    );

    assert_eq!(general.percentile, 50);
    assert_eq!(general.normative.comparison_group, "general population");
    assert!(peers.percentile < general.percentile);
    assert_eq!(peers.normative.comparison_group, "age 25-34");
}

#[tokio::test]
async fn stored_submission_narrates_through_fallback() {
    let registry = Arc::new(AssessmentRegistry::builtin());
    let service = AssessmentService::new(
        registry,
        Arc::new(MemoryRepository::default()),
        Arc::new(InMemoryNormativeStore::default()),
    );
    let assessment = AssessmentId::new(STRESS_RESILIENCE);
    let definition = service.definition(&assessment).expect("builtin");

    let record = service
        .submit(
            &assessment,
            SubmissionRequest {
                responses: uniform(&definition, 1, 12_000),
                demographics: DemographicGroup::default(),
            },
        )
        .expect("submission succeeds");

    let narrator = ResilientNarrator::new(
        Arc::new(UnconfiguredGenerator),
        Arc::new(NarrativeCache::new(std::time::Duration::from_secs(60))),
        RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        },
    );
    let request = prompt::report_request(&definition, &record.result, true);
    let outcome = narrator
        .generate(&prompt::cache_key(&record.result), &request)
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.source, NarrativeSource::Fallback);
    assert_eq!(
        outcome.content,
        Some(prompt::canned_narrative(&definition, &record.result))
    );
    assert_eq!(outcome.attempts, 1);
}
