use crate::infra::{demographics_from, load_norms, load_registry, InMemoryResultRepository};
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use mindscore::assessment::catalog;
use mindscore::assessment::{
    AssessmentDefinition, AssessmentEngine, AssessmentId, AssessmentService, NormativeComparator,
    OverallResult, Response, SubmissionRequest,
};
use mindscore::config::{AppConfig, NarrativeConfig};
use mindscore::error::AppError;
use mindscore::narrative::{
    prompt, GenerationError, NarrativeCache, NarrativeOutcome, NarrativeRequest,
    ResilientNarrator, RetryPolicy, TextGenerator, UnconfiguredGenerator,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Assessment id to score against (for example stress_resilience)
    #[arg(long)]
    pub(crate) assessment: String,
    /// JSON file holding an array of responses
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Normative CSV; defaults to NORMATIVE_TABLE or the bundled sample norms
    #[arg(long)]
    pub(crate) norms: Option<PathBuf>,
    #[arg(long)]
    pub(crate) age_group: Option<String>,
    #[arg(long)]
    pub(crate) gender: Option<String>,
    #[arg(long)]
    pub(crate) region: Option<String>,
    #[arg(long)]
    pub(crate) occupation: Option<String>,
    /// Print the full result as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum DemoProfile {
    High,
    Low,
    Mixed,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Assessment to simulate
    #[arg(long, default_value = catalog::STRESS_RESILIENCE)]
    pub(crate) assessment: String,
    /// Shape of the synthetic answers
    #[arg(long, value_enum, default_value_t = DemoProfile::Mixed)]
    pub(crate) profile: DemoProfile,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut sources = config.sources.clone();
    if let Some(norms) = args.norms {
        sources.normative_table = Some(norms);
    }

    let registry = load_registry(&sources)?;
    let assessment = AssessmentId::new(args.assessment);
    let definition = registry
        .get(&assessment)
        .ok_or_else(|| AppError::Input(format!("unknown assessment '{assessment}'")))?;

    let raw = std::fs::read_to_string(&args.responses)?;
    let responses: Vec<Response> = serde_json::from_str(&raw)?;
    let demographics =
        demographics_from(args.age_group, args.gender, args.region, args.occupation);

    let engine = AssessmentEngine::new(NormativeComparator::new(Arc::new(load_norms(&sources)?)));
    let result = engine.evaluate(&definition, &responses, &demographics);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    render_report(&definition, &result);

    let narrator = narrator_from(&config.narrative, Arc::new(UnconfiguredGenerator));
    let request =
        prompt::report_request(&definition, &result, config.narrative.static_fallback);
    let outcome = narrator
        .generate(&prompt::cache_key(&result), &request)
        .await;
    render_narrative(&outcome);

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        assessment,
        profile,
    } = args;

    let config = AppConfig::load()?;
    let registry = Arc::new(load_registry(&config.sources)?);
    let assessment = AssessmentId::new(assessment);
    let definition = registry
        .get(&assessment)
        .ok_or_else(|| AppError::Input(format!("unknown assessment '{assessment}'")))?;

    println!("Assessment scoring demo ({profile:?} profile)");
    let service = AssessmentService::new(
        registry,
        Arc::new(InMemoryResultRepository::default()),
        Arc::new(load_norms(&config.sources)?),
    );

    let request = SubmissionRequest {
        responses: synthetic_responses(&definition, profile),
        demographics: demographics_from(Some("25-34".to_string()), None, None, None),
    };
    let record = match service.submit(&assessment, request) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };

    let summary = record.summary_view();
    println!(
        "- Stored submission {} at {} ({} responses) -> {} profile",
        summary.submission_id.0,
        summary
            .submitted_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        summary.response_count,
        summary.profile
    );
    render_report(&definition, &record.result);

    println!("\nNarrative fallback walkthrough");
    let generator = Arc::new(OneShotGenerator::default());
    let narrator = ResilientNarrator::new(
        generator,
        Arc::new(NarrativeCache::new(config.narrative.cache_ttl())),
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(50),
            multiplier: 2.0,
            max_delay: Duration::from_millis(200),
        },
    );
    let key = prompt::cache_key(&record.result);
    let request = prompt::report_request(&definition, &record.result, true);

    println!("1. Text service healthy");
    render_narrative(&narrator.generate(&key, &request).await);

    println!("2. Text service down, cached narrative available");
    render_narrative(&narrator.generate(&key, &request).await);

    narrator.cache().clear();
    println!("3. Text service down, cache empty");
    render_narrative(&narrator.generate(&key, &request).await);

    Ok(())
}

fn narrator_from(config: &NarrativeConfig, generator: Arc<dyn TextGenerator>) -> ResilientNarrator {
    ResilientNarrator::new(
        generator,
        Arc::new(NarrativeCache::new(config.cache_ttl())),
        config.retry_policy(),
    )
}

/// Responses shaped to the requested profile, paced slowly enough to avoid
/// the speeding check.
pub(crate) fn synthetic_responses(
    definition: &AssessmentDefinition,
    profile: DemoProfile,
) -> Vec<Response> {
    definition
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let last = question.options.len().saturating_sub(1);
            let selected_option = match profile {
                DemoProfile::High if index % 3 == 0 => last.saturating_sub(1),
                DemoProfile::High => last,
                DemoProfile::Low if index % 3 == 0 => 1.min(last),
                DemoProfile::Low => 0,
                DemoProfile::Mixed => (index * 2 + 1) % question.options.len().max(1),
            };
            Response {
                question_id: question.id.clone(),
                selected_option,
                response_time_ms: 6_500 + (index as u64 % 4) * 1_750,
                confidence: Some(3),
            }
        })
        .collect()
}

pub(crate) fn render_report(definition: &AssessmentDefinition, result: &OverallResult) {
    println!("\n{}", definition.title);
    println!(
        "Overall score: {:.1}/100 | profile {} | percentile {} ({})",
        result.overall_score,
        result.profile,
        result.percentile,
        result.normative.comparison_group
    );
    if !result.normative.data_available {
        println!("Normative data unavailable; percentile shown is the default.");
    }
    if result.skipped_responses > 0 {
        println!(
            "Skipped {} response(s) that did not match this assessment",
            result.skipped_responses
        );
    }

    println!("\nDimension scores");
    for score in &result.dimension_scores {
        if !score.answered {
            println!("- {}: not answered", score.label);
            continue;
        }
        let percentile = result
            .dimension_norms
            .get(&score.dimension)
            .filter(|comparison| comparison.data_available)
            .map(|comparison| format!(", percentile {}", comparison.percentile))
            .unwrap_or_default();
        println!(
            "- {}: {:.0}% ({}/{} points, {}{})",
            score.label,
            score.percentage,
            score.raw_score,
            score.max_possible,
            score.level.label(),
            percentile
        );
    }

    let labels = |ids: &[mindscore::assessment::DimensionId]| -> String {
        ids.iter()
            .filter_map(|id| definition.dimension(id).map(|dimension| dimension.label.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    if !result.strengths.is_empty() {
        println!("\nStrengths: {}", labels(&result.strengths));
    }
    if !result.challenges.is_empty() {
        println!("Growth areas: {}", labels(&result.challenges));
    }

    println!(
        "\nResponse validity: {} (distortion {}/100)",
        result.validity.label.label(),
        result.validity.distortion_score
    );
    for flag in &result.validity.flags {
        println!("- flagged: {:?}", flag);
    }

    println!("\nRecommendations");
    for recommendation in &result.recommendations {
        println!("- {}", recommendation);
    }
}

fn render_narrative(outcome: &NarrativeOutcome) {
    println!(
        "  source={:?} attempts={} success={}",
        outcome.source, outcome.attempts, outcome.success
    );
    if let Some(content) = &outcome.content {
        println!("  {}", content);
    }
    if let Some(error) = &outcome.error {
        println!("  ({})", error);
    }
}

/// Text service that answers its first call and is unavailable afterwards.
#[derive(Default)]
struct OneShotGenerator {
    calls: AtomicU32,
}

#[async_trait]
impl TextGenerator for OneShotGenerator {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String, GenerationError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            let headline = request.prompt.lines().nth(1).unwrap_or_default();
            Ok(format!(
                "Thank you for completing the assessment. {headline}. Your results point to clear next steps."
            ))
        } else {
            Err(GenerationError::Unavailable("503 service unavailable".to_string()))
        }
    }

    fn name(&self) -> &str {
        "demo-one-shot"
    }
}
