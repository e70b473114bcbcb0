use super::definition::AssessmentDefinition;
use super::domain::DimensionScore;

pub const STRENGTHS_FALLBACK: &str =
    "Continue building on your strengths and revisit this assessment periodically.";

/// Ordered, rule-based recommendations for a scored response set.
///
/// Global tier messages come first, then one entry per answered dimension below
/// the dimension threshold, then the assessment's own additions. Duplicates are
/// kept. The strengths fallback only appears when nothing else qualifies.
pub fn generate_recommendations(
    definition: &AssessmentDefinition,
    overall: f64,
    scores: &[DimensionScore],
) -> Vec<String> {
    let rules = &definition.recommendations;
    let mut recommendations = Vec::new();

    if let Some(tier) = rules.tiers.iter().find(|tier| overall < tier.below) {
        recommendations.extend(tier.messages.iter().cloned());
    }

    for score in scores
        .iter()
        .filter(|score| score.answered && score.percentage < rules.dimension_threshold)
    {
        match definition.dimension(&score.dimension) {
            Some(dimension) => recommendations.push(dimension.low_score_recommendation.clone()),
            None => recommendations.push(format!(
                "Focus on developing your {} skills.",
                score.label.to_lowercase()
            )),
        }
    }

    recommendations.extend(rules.assessment_additions.iter().cloned());

    if recommendations.is_empty() {
        recommendations.push(STRENGTHS_FALLBACK.to_string());
    }

    recommendations
}
