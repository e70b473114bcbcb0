use metrics_exporter_prometheus::PrometheusHandle;
use mindscore::assessment::catalog;
use mindscore::assessment::normative::OVERALL_DIMENSION;
use mindscore::assessment::{
    AssessmentId, AssessmentRecord, AssessmentRegistry, DemographicGroup, DimensionId,
    InMemoryNormativeStore, NormativeRecord, NormativeTable, RepositoryError, ResultRepository,
    SubmissionId,
};
use mindscore::config::DataSourceConfig;
use mindscore::error::AppError;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryResultRepository {
    records: Arc<Mutex<HashMap<SubmissionId, AssessmentRecord>>>,
}

impl ResultRepository for InMemoryResultRepository {
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

/// Built-in definitions plus any configured JSON definitions.
pub(crate) fn load_registry(sources: &DataSourceConfig) -> Result<AssessmentRegistry, AppError> {
    let mut registry = AssessmentRegistry::builtin();
    if let Some(path) = &sources.assessment_definitions {
        let loaded = registry.load_json_path(path)?;
        info!(path = %path.display(), loaded, "loaded assessment definitions");
    }
    Ok(registry)
}

/// Normative records from the configured CSV, or the bundled sample table.
pub(crate) fn load_norms(sources: &DataSourceConfig) -> Result<InMemoryNormativeStore, AppError> {
    let records = match &sources.normative_table {
        Some(path) => {
            let records = NormativeTable::from_path(path)?;
            info!(path = %path.display(), records = records.len(), "loaded normative table");
            records
        }
        None => sample_norms(),
    };
    Ok(InMemoryNormativeStore::new(records))
}

/// Synthetic general-population norms for the built-in assessments, with one
/// age-group slice so demographic matching has something to find.
pub(crate) fn sample_norms() -> Vec<NormativeRecord> {
    let mut records = Vec::new();
    for definition in catalog::builtin() {
        let dimensions = std::iter::once(DimensionId::new(OVERALL_DIMENSION)).chain(
            definition
                .dimensions
                .iter()
                .map(|dimension| dimension.id.clone()),
        );
        for dimension in dimensions {
            records.push(sample_record(
                &definition.id,
                &dimension,
                DemographicGroup::default(),
                2_400,
                62.0,
            ));
            records.push(sample_record(
                &definition.id,
                &dimension,
                DemographicGroup {
                    age_group: Some("25-34".to_string()),
                    ..DemographicGroup::default()
                },
                610,
                58.0,
            ));
        }
    }
    records
}

fn sample_record(
    assessment: &AssessmentId,
    dimension: &DimensionId,
    group: DemographicGroup,
    sample_size: u32,
    median: f64,
) -> NormativeRecord {
    NormativeRecord {
        assessment: assessment.clone(),
        dimension: dimension.clone(),
        group,
        sample_size,
        mean: median,
        std_dev: 13.0,
        p25: median - 9.0,
        p50: median,
        p75: median + 9.0,
        p90: median + 17.0,
    }
}

pub(crate) fn demographics_from(
    age_group: Option<String>,
    gender: Option<String>,
    region: Option<String>,
    occupation: Option<String>,
) -> DemographicGroup {
    DemographicGroup {
        age_group,
        gender,
        region,
        occupation,
    }
}
