use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use super::definition::AssessmentDefinition;
use super::domain::{DemographicGroup, DimensionId, DimensionScore, OverallResult, Response};
use super::normative::{NormativeComparator, NormativeStore, OVERALL_DIMENSION};
use super::recommendations::generate_recommendations;
use super::scorer::{aggregate, score_dimensions};
use super::validity::estimate_validity;

const STRENGTH_THRESHOLD: f64 = 70.0;
const CHALLENGE_THRESHOLD: f64 = 50.0;

/// Stateless pipeline turning a response set into an [`OverallResult`].
pub struct AssessmentEngine<S> {
    comparator: NormativeComparator<S>,
}

impl<S: NormativeStore> AssessmentEngine<S> {
    pub fn new(comparator: NormativeComparator<S>) -> Self {
        Self { comparator }
    }

    pub fn comparator(&self) -> &NormativeComparator<S> {
        &self.comparator
    }

    pub fn evaluate(
        &self,
        definition: &AssessmentDefinition,
        responses: &[Response],
        demographics: &DemographicGroup,
    ) -> OverallResult {
        let scoring = score_dimensions(definition, responses);
        let overall_score = aggregate(definition, &scoring.scores);
        let profile = definition.profiles.classify(overall_score).clone();

        let normative = self.comparator.compare(
            &definition.id,
            &DimensionId::new(OVERALL_DIMENSION),
            overall_score,
            demographics,
        );

        let dimension_norms = scoring
            .scores
            .iter()
            .filter(|score| score.answered)
            .map(|score| {
                let comparison = self.comparator.compare(
                    &definition.id,
                    &score.dimension,
                    score.percentage,
                    demographics,
                );
                (score.dimension.clone(), comparison)
            })
            .collect::<BTreeMap<_, _>>();

        let validity = estimate_validity(definition, responses);
        let recommendations = generate_recommendations(definition, overall_score, &scoring.scores);

        debug!(
            assessment = %definition.id,
            overall_score,
            profile = %profile,
            distortion = validity.distortion_score,
            skipped = scoring.skipped,
            "assessment scored"
        );

        OverallResult {
            assessment: definition.id.clone(),
            overall_score,
            percentile: normative.percentile,
            profile,
            strengths: strengths(&scoring.scores),
            challenges: challenges(&scoring.scores),
            dimension_scores: scoring.scores,
            recommendations,
            validity,
            normative,
            dimension_norms,
            skipped_responses: scoring.skipped,
        }
    }
}

fn strengths(scores: &[DimensionScore]) -> Vec<DimensionId> {
    let mut selected: Vec<&DimensionScore> = scores
        .iter()
        .filter(|score| score.answered && score.percentage >= STRENGTH_THRESHOLD)
        .collect();
    selected.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(Ordering::Equal)
    });
    selected.into_iter().map(|score| score.dimension.clone()).collect()
}

fn challenges(scores: &[DimensionScore]) -> Vec<DimensionId> {
    let mut selected: Vec<&DimensionScore> = scores
        .iter()
        .filter(|score| score.answered && score.percentage < CHALLENGE_THRESHOLD)
        .collect();
    selected.sort_by(|a, b| {
        a.percentage
            .partial_cmp(&b.percentage)
            .unwrap_or(Ordering::Equal)
    });
    selected.into_iter().map(|score| score.dimension.clone()).collect()
}
