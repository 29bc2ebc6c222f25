use crate::cli::ServeArgs;
use crate::demo::seed_demo_quiz;
use crate::infra::{AppState, InMemoryQuizRepository, InMemoryStatsStore};
use crate::routes::with_quiz_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use typequiz::config::AppConfig;
use typequiz::error::AppError;
use typequiz::quiz::QuizService;
use typequiz::telemetry;

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

    let repository = Arc::new(InMemoryQuizRepository::default());
    let stats = Arc::new(InMemoryStatsStore::default());
    let quiz_service =
        Arc::new(QuizService::new(repository, stats).with_cache_policy(config.cache));

    if args.seed_demo {
        let quiz = seed_demo_quiz(quiz_service.as_ref())?;
        info!(quiz_id = %quiz.id, slug = %quiz.slug, "demo quiz published");
    }

    let app = with_quiz_routes(quiz_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "quiz service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
