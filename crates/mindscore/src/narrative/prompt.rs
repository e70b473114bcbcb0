use std::fmt::Write;

use crate::assessment::{AssessmentDefinition, OverallResult};

use super::provider::NarrativeRequest;

const SYSTEM_PROMPT: &str = "You are an assessment coach. Write a warm, professional summary \
of the respondent's results in three short paragraphs. Do not invent scores.";

/// Deterministic cache key: identical results share narration.
pub fn cache_key(result: &OverallResult) -> String {
    let mut key = format!(
        "{}:{}:{:.0}",
        result.assessment, result.profile, result.overall_score
    );
    for score in &result.dimension_scores {
        let _ = write!(key, ":{}={:.0}", score.dimension, score.percentage);
    }
    key
}

pub fn report_prompt(definition: &AssessmentDefinition, result: &OverallResult) -> String {
    let mut prompt = format!(
        "Assessment: {}\nOverall score: {:.1}/100 ({} profile, {}th percentile vs {})\n",
        definition.title,
        result.overall_score,
        result.profile,
        result.percentile,
        result.normative.comparison_group
    );

    prompt.push_str("Dimension scores:\n");
    for score in &result.dimension_scores {
        if score.answered {
            let _ = writeln!(
                prompt,
                "- {}: {:.0}% ({})",
                score.label,
                score.percentage,
                score.level.label()
            );
        }
    }

    if !result.recommendations.is_empty() {
        prompt.push_str("Recommendations to weave in:\n");
        for recommendation in &result.recommendations {
            let _ = writeln!(prompt, "- {recommendation}");
        }
    }

    let _ = writeln!(
        prompt,
        "Response validity: {} (distortion {}/100)",
        result.validity.label.label(),
        result.validity.distortion_score
    );

    prompt
}

/// Canned narrative assembled from the result alone, used when the text service
/// and the cache both come up empty.
pub fn canned_narrative(definition: &AssessmentDefinition, result: &OverallResult) -> String {
    let mut text = format!(
        "Your {} result places you in the {} profile with an overall score of {:.0} out of 100.",
        definition.title, result.profile, result.overall_score
    );

    let labels = |ids: &[crate::assessment::DimensionId]| -> Vec<String> {
        ids.iter()
            .filter_map(|id| definition.dimension(id).map(|dimension| dimension.label.clone()))
            .collect()
    };

    let strengths = labels(&result.strengths);
    if !strengths.is_empty() {
        let _ = write!(text, " Your strongest areas are {}.", strengths.join(", "));
    }

    let challenges = labels(&result.challenges);
    if !challenges.is_empty() {
        let _ = write!(
            text,
            " The areas with the most room to grow are {}.",
            challenges.join(", ")
        );
    }

    if let Some(first) = result.recommendations.first() {
        let _ = write!(text, " A good next step: {first}");
    }

    text
}

/// Narration request for a scored result, optionally carrying the canned fallback.
pub fn report_request(
    definition: &AssessmentDefinition,
    result: &OverallResult,
    with_fallback: bool,
) -> NarrativeRequest {
    let request = NarrativeRequest::new(report_prompt(definition, result))
        .with_system_prompt(SYSTEM_PROMPT);
    if with_fallback {
        request.with_fallback(canned_narrative(definition, result))
    } else {
        request
    }
}
