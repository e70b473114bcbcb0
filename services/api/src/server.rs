use crate::cli::ServeArgs;
use crate::infra::{load_norms, load_registry, AppState, InMemoryResultRepository};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mindscore::assessment::{AssessmentRouterState, AssessmentService};
use mindscore::config::AppConfig;
use mindscore::error::AppError;
use mindscore::narrative::{NarrativeCache, ResilientNarrator, UnconfiguredGenerator};
use mindscore::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = Arc::new(load_registry(&config.sources)?);
    let norms = Arc::new(load_norms(&config.sources)?);
    info!(
        assessments = registry.len(),
        normative_records = norms.len(),
        "assessment data loaded"
    );

    let service = Arc::new(AssessmentService::new(
        registry,
        Arc::new(InMemoryResultRepository::default()),
        norms,
    ));
    let narrator = Arc::new(ResilientNarrator::new(
        Arc::new(UnconfiguredGenerator),
        Arc::new(NarrativeCache::new(config.narrative.cache_ttl())),
        config.narrative.retry_policy(),
    ));

    let app = with_assessment_routes(AssessmentRouterState {
        service,
        narrator,
        static_fallback: config.narrative.static_fallback,
    })
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "assessment scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
