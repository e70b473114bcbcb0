use proptest::prelude::*;

use super::common::*;
use crate::assessment::validity::estimate_validity;
use crate::assessment::{aggregate, score_dimensions, AssessmentDefinition, Response};

fn responses_for(
    definition: &AssessmentDefinition,
    picks: Vec<(usize, usize, u64)>,
) -> Vec<Response> {
    picks
        .into_iter()
        .map(|(question, option, elapsed)| {
            let question = &definition.questions[question % definition.questions.len()];
            answer(&question.id, option, elapsed)
        })
        .collect()
}

fn picks() -> impl Strategy<Value = Vec<(usize, usize, u64)>> {
    prop::collection::vec((0usize..12, 0usize..7, 0u64..20_000), 0..30)
}

proptest! {
    #[test]
    fn dimension_percentages_stay_within_bounds(picks in picks()) {
        let definition = resilience();
        let scoring = score_dimensions(&definition, &responses_for(&definition, picks));

        for score in &scoring.scores {
            prop_assert!((0.0..=100.0).contains(&score.percentage));
            prop_assert!(score.raw_score <= score.max_possible);
        }
    }

    #[test]
    fn overall_lies_within_answered_dimension_range(picks in picks()) {
        let definition = resilience();
        let scoring = score_dimensions(&definition, &responses_for(&definition, picks));
        let overall = aggregate(&definition, &scoring.scores);

        let answered: Vec<f64> = scoring
            .scores
            .iter()
            .filter(|score| score.answered)
            .map(|score| score.percentage)
            .collect();

        if answered.is_empty() {
            prop_assert_eq!(overall, 0.0);
        } else {
            let low = answered.iter().copied().fold(f64::INFINITY, f64::min);
            let high = answered.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(overall >= low - 1e-9 && overall <= high + 1e-9);
        }
    }

    #[test]
    fn every_score_selects_exactly_one_profile(score in 0.0f64..=100.0) {
        let definition = faith();
        let bands = definition.profiles.bands();
        let matches: Vec<&String> = bands
            .iter()
            .enumerate()
            .filter(|(index, band)| {
                let last = *index == bands.len() - 1;
                score >= band.min && (score < band.max || (last && score <= band.max))
            })
            .map(|(_, band)| &band.label)
            .collect();

        prop_assert_eq!(matches.len(), 1);
        prop_assert_eq!(definition.profiles.classify(score), matches[0]);
    }

    #[test]
    fn distortion_never_exceeds_one_hundred(picks in picks()) {
        let definition = faith();
        let validity = estimate_validity(&definition, &responses_for(&definition, picks));

        prop_assert!(validity.distortion_score <= 100);
    }
}
