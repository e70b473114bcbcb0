use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::bands::{BandTable, BandTableError};
use super::domain::{AssessmentId, DimensionId, Question};

/// Scored sub-trait with its aggregation weight and low-score advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDefinition {
    pub id: DimensionId,
    pub label: String,
    pub weight: f64,
    /// Answers on this dimension feed the social-desirability heuristic.
    #[serde(default)]
    pub desirability_sensitive: bool,
    pub low_score_recommendation: String,
}

/// Overall-score tier: applies when the overall score is below `below`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTier {
    pub below: f64,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRules {
    /// Checked in order; the first tier whose threshold exceeds the overall score wins.
    pub tiers: Vec<RecommendationTier>,
    #[serde(default = "default_dimension_threshold")]
    pub dimension_threshold: f64,
    #[serde(default)]
    pub assessment_additions: Vec<String>,
}

fn default_dimension_threshold() -> f64 {
    60.0
}

/// Complete static configuration for one assessment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentDefinition {
    pub id: AssessmentId,
    pub title: String,
    pub description: String,
    pub dimensions: Vec<DimensionDefinition>,
    pub questions: Vec<Question>,
    pub profiles: BandTable<String>,
    pub recommendations: RecommendationRules,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("assessment {0} declares no dimensions")]
    NoDimensions(AssessmentId),
    #[error("assessment {assessment} declares dimension {dimension} twice")]
    DuplicateDimension {
        assessment: AssessmentId,
        dimension: DimensionId,
    },
    #[error("assessment {assessment} declares question {question} twice")]
    DuplicateQuestion {
        assessment: AssessmentId,
        question: String,
    },
    #[error("question {question} references unknown dimension {dimension}")]
    UnknownDimension {
        question: String,
        dimension: DimensionId,
    },
    #[error("question {0} has no answer options")]
    NoOptions(String),
    #[error("question {0} has a zero point ceiling")]
    ZeroMaxPoints(String),
    #[error("question {question} option {option} awards {points} points to {dimension} (max {max})")]
    PointsAboveMax {
        question: String,
        option: usize,
        dimension: DimensionId,
        points: u8,
        max: u8,
    },
    #[error("dimension {dimension} has invalid weight {weight}")]
    InvalidWeight { dimension: DimensionId, weight: f64 },
    #[error("assessment {0} weights sum to zero")]
    ZeroTotalWeight(AssessmentId),
    #[error("assessment {assessment} has an invalid profile table: {source}")]
    Profiles {
        assessment: AssessmentId,
        #[source]
        source: BandTableError,
    },
}

impl AssessmentDefinition {
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.dimensions.is_empty() {
            return Err(DefinitionError::NoDimensions(self.id.clone()));
        }

        let mut dimension_ids = HashSet::new();
        let mut total_weight = 0.0;
        for dimension in &self.dimensions {
            if !dimension_ids.insert(&dimension.id) {
                return Err(DefinitionError::DuplicateDimension {
                    assessment: self.id.clone(),
                    dimension: dimension.id.clone(),
                });
            }
            if !dimension.weight.is_finite() || dimension.weight < 0.0 {
                return Err(DefinitionError::InvalidWeight {
                    dimension: dimension.id.clone(),
                    weight: dimension.weight,
                });
            }
            total_weight += dimension.weight;
        }
        if total_weight <= 0.0 {
            return Err(DefinitionError::ZeroTotalWeight(self.id.clone()));
        }

        let mut question_ids = HashSet::new();
        for question in &self.questions {
            if !question_ids.insert(question.id.as_str()) {
                return Err(DefinitionError::DuplicateQuestion {
                    assessment: self.id.clone(),
                    question: question.id.clone(),
                });
            }
            if question.options.is_empty() {
                return Err(DefinitionError::NoOptions(question.id.clone()));
            }
            if question.max_points == 0 {
                return Err(DefinitionError::ZeroMaxPoints(question.id.clone()));
            }
            for dimension in question.dimensions() {
                if !dimension_ids.contains(dimension) {
                    return Err(DefinitionError::UnknownDimension {
                        question: question.id.clone(),
                        dimension: dimension.clone(),
                    });
                }
            }
            for (index, option) in question.options.iter().enumerate() {
                if let Some((dimension, points)) = option
                    .points
                    .iter()
                    .find(|(_, points)| **points > question.max_points)
                {
                    return Err(DefinitionError::PointsAboveMax {
                        question: question.id.clone(),
                        option: index,
                        dimension: dimension.clone(),
                        points: *points,
                        max: question.max_points,
                    });
                }
            }
        }

        // Hand-built definitions never pass through the deserializer's band checks.
        BandTable::new(self.profiles.bands().to_vec()).map_err(|source| {
            DefinitionError::Profiles {
                assessment: self.id.clone(),
                source,
            }
        })?;

        Ok(())
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }

    pub fn dimension(&self, id: &DimensionId) -> Option<&DimensionDefinition> {
        self.dimensions.iter().find(|dimension| &dimension.id == id)
    }
}
