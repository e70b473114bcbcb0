//! Response-quality heuristics.
//!
//! These checks are fixed-penalty heuristics, not a statistically validated
//! detector. Each one is an independent trigger and the penalties add up,
//! capped at 100.

use serde::{Deserialize, Serialize};

use super::definition::AssessmentDefinition;
use super::domain::Response;
use super::scorer::resolve;

pub const SOCIAL_DESIRABILITY_PENALTY: u8 = 15;
pub const SPEEDING_PENALTY: u8 = 15;
pub const PATTERN_PENALTY: u8 = 20;

const DESIRABLE_POINTS: u8 = 4;
const DESIRABILITY_RATIO: f64 = 0.85;
const SPEEDING_THRESHOLD_MS: u64 = 5_000;
const SPEEDING_RATIO: f64 = 0.5;
const POSITION_SLOTS: usize = 4;
const PATTERN_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityLabel {
    High,
    Moderate,
    Questionable,
    Low,
}

impl ValidityLabel {
    pub fn from_distortion(distortion: u8) -> Self {
        match distortion {
            0..=19 => ValidityLabel::High,
            20..=39 => ValidityLabel::Moderate,
            40..=59 => ValidityLabel::Questionable,
            _ => ValidityLabel::Low,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ValidityLabel::High => "High",
            ValidityLabel::Moderate => "Moderate",
            ValidityLabel::Questionable => "Questionable",
            ValidityLabel::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionFlag {
    SocialDesirability,
    Speeding,
    PatternResponding,
}

impl DistortionFlag {
    pub const fn penalty(self) -> u8 {
        match self {
            DistortionFlag::SocialDesirability => SOCIAL_DESIRABILITY_PENALTY,
            DistortionFlag::Speeding => SPEEDING_PENALTY,
            DistortionFlag::PatternResponding => PATTERN_PENALTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityAssessment {
    /// 0..=100, higher means less trustworthy.
    pub distortion_score: u8,
    pub label: ValidityLabel,
    pub flags: Vec<DistortionFlag>,
}

impl ValidityAssessment {
    pub fn from_flags(flags: Vec<DistortionFlag>) -> Self {
        let total: u32 = flags.iter().map(|flag| u32::from(flag.penalty())).sum();
        let distortion_score = total.min(100) as u8;
        Self {
            distortion_score,
            label: ValidityLabel::from_distortion(distortion_score),
            flags,
        }
    }
}

pub fn estimate_validity(
    definition: &AssessmentDefinition,
    responses: &[Response],
) -> ValidityAssessment {
    let mut flags = Vec::new();

    if social_desirability(definition, responses) {
        flags.push(DistortionFlag::SocialDesirability);
    }
    if speeding(responses) {
        flags.push(DistortionFlag::Speeding);
    }
    if pattern_responding(definition, responses) {
        flags.push(DistortionFlag::PatternResponding);
    }

    ValidityAssessment::from_flags(flags)
}

fn social_desirability(definition: &AssessmentDefinition, responses: &[Response]) -> bool {
    let mut sensitive = 0usize;
    let mut desirable = 0usize;

    for response in responses {
        let Some(question) = resolve(definition, response) else {
            continue;
        };
        let is_sensitive = definition
            .dimension(&question.dimension)
            .map(|dimension| dimension.desirability_sensitive)
            .unwrap_or(false);
        if !is_sensitive {
            continue;
        }

        sensitive += 1;
        if question.options[response.selected_option].points_for(&question.dimension)
            >= DESIRABLE_POINTS
        {
            desirable += 1;
        }
    }

    sensitive > 0 && desirable as f64 / sensitive as f64 > DESIRABILITY_RATIO
}

fn speeding(responses: &[Response]) -> bool {
    if responses.is_empty() {
        return false;
    }
    let fast = responses
        .iter()
        .filter(|response| response.response_time_ms < SPEEDING_THRESHOLD_MS)
        .count();
    fast as f64 / responses.len() as f64 > SPEEDING_RATIO
}

fn pattern_responding(definition: &AssessmentDefinition, responses: &[Response]) -> bool {
    let mut slots = [0usize; POSITION_SLOTS];
    let mut counted = 0usize;

    for response in responses {
        let Some(question) = resolve(definition, response) else {
            continue;
        };
        let slot = response.selected_option * POSITION_SLOTS / question.options.len();
        slots[slot.min(POSITION_SLOTS - 1)] += 1;
        counted += 1;
    }

    counted > 0
        && slots
            .iter()
            .any(|count| *count as f64 / counted as f64 > PATTERN_RATIO)
}
