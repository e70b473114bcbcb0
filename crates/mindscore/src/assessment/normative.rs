use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use super::domain::{AssessmentId, DemographicGroup, DimensionId};

/// Dimension key used for overall-score norms.
pub const OVERALL_DIMENSION: &str = "overall";

const GENERAL_POPULATION: &str = "general population";

/// Reference distribution for one assessment dimension and demographic group.
/// Written offline, read-only to the scoring pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormativeRecord {
    pub assessment: AssessmentId,
    pub dimension: DimensionId,
    pub group: DemographicGroup,
    pub sample_size: u32,
    pub mean: f64,
    pub std_dev: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

impl NormativeRecord {
    /// Number of attributes matched against `query`, or `None` when any
    /// attribute set on the record disagrees with the query.
    fn specificity(&self, query: &DemographicGroup) -> Option<usize> {
        let mut matched = 0;
        for ((_, wanted), (_, offered)) in query.attributes().iter().zip(self.group.attributes()) {
            match (wanted, offered) {
                (_, None) => {}
                (Some(wanted), Some(offered)) if wanted.eq_ignore_ascii_case(offered) => {
                    matched += 1
                }
                _ => return None,
            }
        }
        Some(matched)
    }

    fn has_ordered_cut_points(&self) -> bool {
        self.p25 <= self.p50 && self.p50 <= self.p75 && self.p75 <= self.p90
    }

    /// Piecewise-linear percentile through the stored cut points, with the
    /// tails anchored at three standard deviations from the mean. A score equal
    /// to several tied cut points takes the middle of their percentiles.
    pub fn percentile_for(&self, score: f64) -> u8 {
        let cut_points = [
            (self.p25, 25.0),
            (self.p50, 50.0),
            (self.p75, 75.0),
            (self.p90, 90.0),
        ];
        let spread = self.std_dev.max(0.0) * 3.0;
        let lower_tail = ((self.mean - spread).min(self.p25), 1.0);
        let upper_tail = ((self.mean + spread).max(self.p90), 99.0);

        let mut tied = cut_points
            .iter()
            .filter(|(value, _)| *value == score)
            .map(|(_, percentile)| *percentile);
        let percentile = if let Some(lowest) = tied.next() {
            let highest = tied.last().unwrap_or(lowest);
            (lowest + highest) / 2.0
        } else if score < self.p25 {
            interpolate(lower_tail, cut_points[0], score)
        } else if score > self.p90 {
            interpolate(cut_points[3], upper_tail, score)
        } else {
            cut_points
                .windows(2)
                .find(|pair| score > pair[0].0 && score < pair[1].0)
                .map(|pair| interpolate(pair[0], pair[1], score))
                .unwrap_or(50.0)
        };

        percentile.round().clamp(1.0, 99.0) as u8
    }
}

fn interpolate((x0, y0): (f64, f64), (x1, y1): (f64, f64), score: f64) -> f64 {
    if score <= x0 {
        y0
    } else if score >= x1 {
        y1
    } else {
        y0 + (score - x0) / (x1 - x0) * (y1 - y0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormativeStoreError {
    #[error("normative store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to stored normative distributions.
pub trait NormativeStore: Send + Sync {
    fn records(
        &self,
        assessment: &AssessmentId,
        dimension: &DimensionId,
    ) -> Result<Vec<NormativeRecord>, NormativeStoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryNormativeStore {
    records: Arc<RwLock<Vec<NormativeRecord>>>,
}

impl InMemoryNormativeStore {
    pub fn new(records: Vec<NormativeRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn extend(&self, records: impl IntoIterator<Item = NormativeRecord>) {
        self.records
            .write()
            .expect("normative store lock poisoned")
            .extend(records);
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .expect("normative store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NormativeStore for InMemoryNormativeStore {
    fn records(
        &self,
        assessment: &AssessmentId,
        dimension: &DimensionId,
    ) -> Result<Vec<NormativeRecord>, NormativeStoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| NormativeStoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|record| &record.assessment == assessment && &record.dimension == dimension)
            .cloned()
            .collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormativeImportError {
    #[error("failed to read normative table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid normative CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: cut points must be non-decreasing (p25 <= p50 <= p75 <= p90)")]
    UnorderedCutPoints { row: usize },
    #[error("row {row}: standard deviation must be non-negative")]
    NegativeSpread { row: usize },
}

/// Importer for batch-generated normative tables.
pub struct NormativeTable;

impl NormativeTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<NormativeRecord>, NormativeImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<NormativeRecord>, NormativeImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (index, row) in csv_reader.deserialize::<NormativeRow>().enumerate() {
            let row = row?;
            let record = row.into_record();
            let line = index + 2;
            if !record.has_ordered_cut_points() {
                return Err(NormativeImportError::UnorderedCutPoints { row: line });
            }
            if record.std_dev < 0.0 {
                return Err(NormativeImportError::NegativeSpread { row: line });
            }
            records.push(record);
        }

        Ok(records)
    }
}

#[derive(Debug, Deserialize)]
struct NormativeRow {
    assessment: String,
    dimension: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    age_group: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    gender: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    region: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    occupation: Option<String>,
    sample_size: u32,
    mean: f64,
    std_dev: f64,
    p25: f64,
    p50: f64,
    p75: f64,
    p90: f64,
}

impl NormativeRow {
    fn into_record(self) -> NormativeRecord {
        NormativeRecord {
            assessment: AssessmentId(self.assessment),
            dimension: DimensionId(self.dimension),
            group: DemographicGroup {
                age_group: self.age_group,
                gender: self.gender,
                region: self.region,
                occupation: self.occupation,
            },
            sample_size: self.sample_size,
            mean: self.mean,
            std_dev: self.std_dev,
            p25: self.p25,
            p50: self.p50,
            p75: self.p75,
            p90: self.p90,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpretation {
    Exceptional,
    AboveAverage,
    Average,
    BelowAverage,
    NeedsDevelopment,
}

impl Interpretation {
    pub fn from_percentile(percentile: u8) -> Self {
        match percentile {
            90.. => Interpretation::Exceptional,
            75..=89 => Interpretation::AboveAverage,
            25..=74 => Interpretation::Average,
            10..=24 => Interpretation::BelowAverage,
            _ => Interpretation::NeedsDevelopment,
        }
    }

    /// Coarse reading of a raw score when no normative data is available.
    pub fn from_raw_score(score: f64) -> Self {
        if score >= 70.0 {
            Interpretation::AboveAverage
        } else if score >= 30.0 {
            Interpretation::Average
        } else {
            Interpretation::BelowAverage
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Interpretation::Exceptional => "exceptional",
            Interpretation::AboveAverage => "above_average",
            Interpretation::Average => "average",
            Interpretation::BelowAverage => "below_average",
            Interpretation::NeedsDevelopment => "needs_development",
        }
    }
}

/// Outcome of comparing a score to its reference population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormativeComparison {
    pub percentile: u8,
    pub comparison_group: String,
    pub sample_size: u32,
    pub interpretation: Interpretation,
    pub data_available: bool,
    pub similar_score_range: String,
    pub improvement_potential: String,
}

impl NormativeComparison {
    /// Result used whenever no normative record can be consulted.
    pub fn unavailable(score: f64) -> Self {
        let percentile = 50;
        Self {
            percentile,
            comparison_group: GENERAL_POPULATION.to_string(),
            sample_size: 0,
            interpretation: Interpretation::from_raw_score(score),
            data_available: false,
            similar_score_range: similar_score_range(percentile).to_string(),
            improvement_potential: improvement_potential(percentile).to_string(),
        }
    }

    fn from_record(record: &NormativeRecord, score: f64) -> Self {
        let percentile = record.percentile_for(score);
        Self {
            percentile,
            comparison_group: record.group.describe(),
            sample_size: record.sample_size,
            interpretation: Interpretation::from_percentile(percentile),
            data_available: true,
            similar_score_range: similar_score_range(percentile).to_string(),
            improvement_potential: improvement_potential(percentile).to_string(),
        }
    }
}

pub fn similar_score_range(percentile: u8) -> &'static str {
    match percentile {
        90.. => "Top 10% of respondents",
        75..=89 => "Top 25% of respondents",
        50..=74 => "Above the median of respondents",
        25..=49 => "Within the middle range of respondents",
        _ => "Bottom quarter of respondents",
    }
}

pub fn improvement_potential(percentile: u8) -> &'static str {
    match percentile {
        90.. => "Maintain current practices and consider mentoring others.",
        75..=89 => "Small, targeted refinements can move you into the top tier.",
        50..=74 => "Focused practice in a few areas can yield noticeable gains.",
        25..=49 => "Consistent effort can produce significant improvement.",
        _ => "Substantial growth is possible with structured support.",
    }
}

/// Fail-open lookup against a normative store: every failure path produces
/// [`NormativeComparison::unavailable`].
pub struct NormativeComparator<S> {
    store: Arc<S>,
}

impl<S> Clone for NormativeComparator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: NormativeStore> NormativeComparator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn compare(
        &self,
        assessment: &AssessmentId,
        dimension: &DimensionId,
        score: f64,
        demographics: &DemographicGroup,
    ) -> NormativeComparison {
        let records = match self.store.records(assessment, dimension) {
            Ok(records) => records,
            Err(err) => {
                warn!(%assessment, %dimension, error = %err, "normative lookup failed; using default");
                return NormativeComparison::unavailable(score);
            }
        };

        match closest_record(&records, demographics) {
            Some(record) => NormativeComparison::from_record(record, score),
            None => {
                debug!(%assessment, %dimension, "no normative record for demographic; using default");
                NormativeComparison::unavailable(score)
            }
        }
    }
}

fn closest_record<'a>(
    records: &'a [NormativeRecord],
    demographics: &DemographicGroup,
) -> Option<&'a NormativeRecord> {
    records
        .iter()
        .filter(|record| record.has_ordered_cut_points())
        .filter_map(|record| {
            record
                .specificity(demographics)
                .map(|matched| (matched, record))
        })
        .max_by_key(|(matched, record)| (*matched, record.sample_size))
        .map(|(_, record)| record)
}
