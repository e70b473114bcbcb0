use std::collections::BTreeMap;

use tracing::warn;

use super::bands::level_ladder;
use super::definition::AssessmentDefinition;
use super::domain::{clamp_percentage, DimensionId, DimensionScore, Question, Response};

/// Dimension scores plus the number of responses that could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionScoring {
    pub scores: Vec<DimensionScore>,
    pub skipped: usize,
}

#[derive(Default)]
struct Tally {
    total: u32,
    max: u32,
}

/// Resolve a response to its question and selected option index, or `None`
/// when the response cannot be scored against this definition.
pub(crate) fn resolve<'a>(
    definition: &'a AssessmentDefinition,
    response: &Response,
) -> Option<&'a Question> {
    let question = definition.question(&response.question_id)?;
    if response.selected_option >= question.options.len() {
        return None;
    }
    Some(question)
}

/// Reduce a response set to one score per declared dimension.
pub fn score_dimensions(
    definition: &AssessmentDefinition,
    responses: &[Response],
) -> DimensionScoring {
    let mut tallies: BTreeMap<&DimensionId, Tally> = BTreeMap::new();
    let mut skipped = 0;

    for response in responses {
        let Some(question) = resolve(definition, response) else {
            warn!(
                assessment = %definition.id,
                question_id = %response.question_id,
                selected_option = response.selected_option,
                "skipping unscoreable response"
            );
            skipped += 1;
            continue;
        };

        let option = &question.options[response.selected_option];
        for dimension in question.dimensions() {
            let tally = tallies.entry(dimension).or_default();
            tally.total += u32::from(option.points_for(dimension));
            tally.max += u32::from(question.max_points);
        }
    }

    let ladder = level_ladder();
    let scores = definition
        .dimensions
        .iter()
        .map(|dimension| {
            let (total, max) = tallies
                .get(&dimension.id)
                .map(|tally| (tally.total, tally.max))
                .unwrap_or((0, 0));
            let percentage = if max == 0 {
                0.0
            } else {
                clamp_percentage(100.0 * f64::from(total) / f64::from(max))
            };

            DimensionScore {
                dimension: dimension.id.clone(),
                label: dimension.label.clone(),
                raw_score: total,
                max_possible: max,
                percentage,
                level: *ladder.classify(percentage),
                answered: max > 0,
            }
        })
        .collect();

    DimensionScoring { scores, skipped }
}

/// Weighted mean of answered dimension percentages, normalised by the weight
/// actually used. Returns 0 when no weighted dimension was answered.
pub fn aggregate(definition: &AssessmentDefinition, scores: &[DimensionScore]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_used = 0.0;

    for score in scores.iter().filter(|score| score.answered) {
        let Some(weight) = definition
            .dimension(&score.dimension)
            .map(|dimension| dimension.weight)
            .filter(|weight| *weight > 0.0)
        else {
            continue;
        };
        weighted_sum += weight * score.percentage;
        weight_used += weight;
    }

    if weight_used <= 0.0 {
        return 0.0;
    }

    clamp_percentage(weighted_sum / weight_used)
}
