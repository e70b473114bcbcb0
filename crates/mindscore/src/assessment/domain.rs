use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::normative::NormativeComparison;
use super::validity::ValidityAssessment;

/// Key identifying an assessment type (for example `stress_resilience`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentId(pub String);

impl AssessmentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named sub-trait scored independently within an assessment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionId(pub String);

impl DimensionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for stored submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

/// Single answer choice carrying its per-dimension point vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub points: BTreeMap<DimensionId, u8>,
}

impl AnswerOption {
    /// Option awarding points to a single dimension.
    pub fn scored(label: impl Into<String>, dimension: &DimensionId, points: u8) -> Self {
        let mut vector = BTreeMap::new();
        vector.insert(dimension.clone(), points);
        Self {
            label: label.into(),
            points: vector,
        }
    }

    pub fn points_for(&self, dimension: &DimensionId) -> u8 {
        self.points.get(dimension).copied().unwrap_or(0)
    }
}

fn default_max_points() -> u8 {
    5
}

/// Static question definition, immutable once the bank is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub dimension: DimensionId,
    pub prompt: String,
    #[serde(default = "default_max_points")]
    pub max_points: u8,
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Every dimension this question contributes to, primary dimension first.
    pub fn dimensions(&self) -> Vec<&DimensionId> {
        let mut dimensions = vec![&self.dimension];
        for option in &self.options {
            for dimension in option.points.keys() {
                if !dimensions.contains(&dimension) {
                    dimensions.push(dimension);
                }
            }
        }
        dimensions
    }
}

/// One recorded answer within an assessment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub question_id: String,
    pub selected_option: usize,
    pub response_time_ms: u64,
    #[serde(default)]
    pub confidence: Option<u8>,
}

/// Qualitative level derived from a dimension percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    NeedsImprovement,
    Fair,
    Good,
    Excellent,
}

impl ScoreLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreLevel::NeedsImprovement => "needs improvement",
            ScoreLevel::Fair => "fair",
            ScoreLevel::Good => "good",
            ScoreLevel::Excellent => "excellent",
        }
    }
}

/// Per-dimension output of a scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: DimensionId,
    pub label: String,
    pub raw_score: u32,
    pub max_possible: u32,
    pub percentage: f64,
    pub level: ScoreLevel,
    pub answered: bool,
}

/// Demographic attributes used to select a normative comparison group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

impl DemographicGroup {
    pub(crate) fn attributes(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("age", self.age_group.as_deref()),
            ("gender", self.gender.as_deref()),
            ("region", self.region.as_deref()),
            ("occupation", self.occupation.as_deref()),
        ]
    }

    pub fn is_general(&self) -> bool {
        self.attributes().iter().all(|(_, value)| value.is_none())
    }

    /// Human readable descriptor such as `age 25-34, region midwest`.
    pub fn describe(&self) -> String {
        if self.is_general() {
            return "general population".to_string();
        }
        self.attributes()
            .iter()
            .filter_map(|(name, value)| value.map(|value| format!("{name} {value}")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Complete scoring output for one response set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallResult {
    pub assessment: AssessmentId,
    pub overall_score: f64,
    pub percentile: u8,
    pub profile: String,
    pub dimension_scores: Vec<DimensionScore>,
    pub strengths: Vec<DimensionId>,
    pub challenges: Vec<DimensionId>,
    pub recommendations: Vec<String>,
    pub validity: ValidityAssessment,
    pub normative: NormativeComparison,
    pub dimension_norms: BTreeMap<DimensionId, NormativeComparison>,
    pub skipped_responses: usize,
}

/// Persisted submission, owned by the service layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub submission_id: SubmissionId,
    pub submitted_at: DateTime<Utc>,
    pub demographics: DemographicGroup,
    pub responses: Vec<Response>,
    pub result: OverallResult,
}

/// Clamp any computed percentage into `[0, 100]`, mapping NaN to 0.
pub(crate) fn clamp_percentage(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}
