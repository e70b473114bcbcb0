//! Built-in assessment definitions.
//!
//! Every built-in question uses the same five-point agreement scale, scored 1
//! through 5 on the question's dimension.

use std::collections::BTreeMap;

use super::bands::profile_table;
use super::definition::{
    AssessmentDefinition, DimensionDefinition, RecommendationRules, RecommendationTier,
};
use super::domain::{AnswerOption, AssessmentId, DimensionId, Question};

pub const STRESS_RESILIENCE: &str = "stress_resilience";
pub const FAITH_VALUES: &str = "faith_values";

const AGREEMENT_SCALE: [&str; 5] = [
    "Strongly disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly agree",
];

pub fn builtin() -> Vec<AssessmentDefinition> {
    vec![stress_resilience(), faith_values()]
}

pub fn stress_resilience() -> AssessmentDefinition {
    let dimensions = vec![
        dimension(
            "emotional",
            "Emotional Regulation",
            0.20,
            false,
            "Practice a daily two-minute breathing or labeling routine to steady emotional reactions.",
        ),
        dimension(
            "cognitive",
            "Cognitive Flexibility",
            0.15,
            false,
            "When a setback happens, write down two alternative explanations before reacting.",
        ),
        dimension(
            "physical",
            "Physical Vitality",
            0.15,
            false,
            "Protect sleep and schedule short movement breaks on high-pressure days.",
        ),
        dimension(
            "social",
            "Social Support",
            0.20,
            false,
            "Identify two people you can call on under pressure and reach out to one this week.",
        ),
        dimension(
            "adaptability",
            "Adaptability",
            0.15,
            false,
            "Take on one small unfamiliar task each week to build comfort with change.",
        ),
        dimension(
            "purpose",
            "Sense of Purpose",
            0.15,
            false,
            "Reconnect daily tasks to a personal goal by writing a one-line purpose statement.",
        ),
    ];

    let questions = vec![
        likert("sr-01", "emotional", "I can calm myself down when I feel overwhelmed."),
        likert("sr-02", "emotional", "Strong emotions rarely stop me from doing what I planned."),
        likert("sr-03", "cognitive", "I look for other ways to see a problem when I get stuck."),
        likert("sr-04", "cognitive", "I can keep setbacks in perspective."),
        likert("sr-05", "physical", "I usually get enough sleep to feel rested."),
        likert("sr-06", "physical", "I keep up healthy routines during stressful periods."),
        likert("sr-07", "social", "I have people I can rely on when things get hard."),
        likert("sr-08", "social", "I am comfortable asking others for help."),
        cross_loaded(
            "sr-09",
            "adaptability",
            "emotional",
            "I stay composed when plans change at the last minute.",
        ),
        likert("sr-10", "adaptability", "I adjust quickly to new situations."),
        likert("sr-11", "purpose", "My daily work connects to something that matters to me."),
        likert("sr-12", "purpose", "I have clear goals that keep me going through difficulty."),
    ];

    let profiles = profile_table(&[
        (0.0, 40.0, "Clay"),
        (40.0, 55.0, "Wood"),
        (55.0, 70.0, "Stone"),
        (70.0, 85.0, "Steel"),
        (85.0, 100.0, "Diamond"),
    ])
    .expect("built-in resilience bands cover 0..=100");

    AssessmentDefinition {
        id: AssessmentId::new(STRESS_RESILIENCE),
        title: "Stress Resilience Profile".to_string(),
        description: "Measures how well a person absorbs, adapts to and recovers from pressure."
            .to_string(),
        dimensions,
        questions,
        profiles,
        recommendations: RecommendationRules {
            tiers: vec![
                tier(
                    50.0,
                    &[
                        "Consider working with a coach or counselor to build a structured resilience plan.",
                        "Start with one recovery habit and track it for 30 days.",
                    ],
                ),
                tier(
                    70.0,
                    &["Build on your foundation by scheduling regular recovery time each week."],
                ),
                tier(
                    85.0,
                    &["Fine-tune your resilience by stress-testing routines ahead of demanding periods."],
                ),
            ],
            dimension_threshold: 60.0,
            assessment_additions: vec![
                "Retake this assessment in 90 days to measure your progress.".to_string(),
            ],
        },
    }
}

pub fn faith_values() -> AssessmentDefinition {
    let dimensions = vec![
        dimension(
            "integrity",
            "Integrity",
            0.20,
            true,
            "Choose one commitment this month and review each week whether your actions matched it.",
        ),
        dimension(
            "justice",
            "Justice",
            0.15,
            true,
            "Look for one concrete way to advocate for someone treated unfairly in your community.",
        ),
        dimension(
            "compassion",
            "Compassion",
            0.20,
            false,
            "Set aside time each week to listen to someone without offering solutions.",
        ),
        dimension(
            "stewardship",
            "Stewardship",
            0.15,
            false,
            "Review how your time and resources line up with the values you hold most.",
        ),
        dimension(
            "humility",
            "Humility",
            0.15,
            false,
            "Ask a trusted colleague for candid feedback and respond only with questions.",
        ),
        dimension(
            "devotion",
            "Devotion",
            0.15,
            false,
            "Establish a short daily reflection practice and protect it on busy days.",
        ),
    ];

    let questions = vec![
        likert("fv-01", "integrity", "I keep my word even when it costs me."),
        likert("fv-02", "integrity", "I act the same way whether or not anyone is watching."),
        likert("fv-03", "justice", "I speak up when I see someone treated unfairly."),
        likert("fv-04", "justice", "Fair treatment of others guides my decisions at work."),
        likert("fv-05", "compassion", "I notice when people around me are struggling."),
        likert("fv-06", "compassion", "I make time to help others even when I am busy."),
        likert("fv-07", "stewardship", "I use my money and time in line with my values."),
        likert("fv-08", "stewardship", "I take care of what has been entrusted to me."),
        likert("fv-09", "humility", "I readily admit when I am wrong."),
        likert("fv-10", "humility", "I give credit to others for shared successes."),
        likert("fv-11", "devotion", "I set aside regular time for reflection or prayer."),
        likert("fv-12", "devotion", "My beliefs shape how I spend an ordinary day."),
    ];

    let profiles = profile_table(&[
        (0.0, 40.0, "Seeker"),
        (40.0, 55.0, "Explorer"),
        (55.0, 70.0, "Practitioner"),
        (70.0, 85.0, "Steward"),
        (85.0, 100.0, "Exemplar"),
    ])
    .expect("built-in faith value bands cover 0..=100");

    AssessmentDefinition {
        id: AssessmentId::new(FAITH_VALUES),
        title: "Faith & Values Alignment".to_string(),
        description: "Measures how consistently core values show up in everyday decisions."
            .to_string(),
        dimensions,
        questions,
        profiles,
        recommendations: RecommendationRules {
            tiers: vec![
                tier(
                    50.0,
                    &[
                        "Pick one core value and set a simple weekly practice that expresses it.",
                        "Find a mentor or small group to reflect with on a regular basis.",
                    ],
                ),
                tier(
                    70.0,
                    &["Deepen consistency by journaling where your values showed up each day."],
                ),
                tier(
                    85.0,
                    &["Look for opportunities to mentor others in living out their values."],
                ),
            ],
            dimension_threshold: 60.0,
            assessment_additions: vec![
                "Discuss your results with a trusted mentor or faith community leader.".to_string(),
            ],
        },
    }
}

fn dimension(
    id: &str,
    label: &str,
    weight: f64,
    desirability_sensitive: bool,
    low_score_recommendation: &str,
) -> DimensionDefinition {
    DimensionDefinition {
        id: DimensionId::new(id),
        label: label.to_string(),
        weight,
        desirability_sensitive,
        low_score_recommendation: low_score_recommendation.to_string(),
    }
}

fn likert(id: &str, dimension: &str, prompt: &str) -> Question {
    let dimension = DimensionId::new(dimension);
    let options = AGREEMENT_SCALE
        .iter()
        .zip(1u8..)
        .map(|(label, points)| AnswerOption::scored(*label, &dimension, points))
        .collect();

    Question {
        id: id.to_string(),
        dimension,
        prompt: prompt.to_string(),
        max_points: 5,
        options,
    }
}

/// Likert question that also awards its points to a secondary dimension.
fn cross_loaded(id: &str, primary: &str, secondary: &str, prompt: &str) -> Question {
    let secondary = DimensionId::new(secondary);
    let mut question = likert(id, primary, prompt);
    for option in &mut question.options {
        let points = option.points_for(&question.dimension);
        let mut vector = BTreeMap::new();
        vector.insert(question.dimension.clone(), points);
        vector.insert(secondary.clone(), points);
        option.points = vector;
    }
    question
}

fn tier(below: f64, messages: &[&str]) -> RecommendationTier {
    RecommendationTier {
        below,
        messages: messages.iter().map(|message| message.to_string()).collect(),
    }
}
