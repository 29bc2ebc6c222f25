use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use typequiz::events::StatsRepository;
use typequiz::quiz::{quiz_router, QuizRepository, QuizService};

pub(crate) fn with_quiz_routes<R, S>(service: Arc<QuizService<R, S>>) -> axum::Router
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    quiz_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::seed_demo_quiz;
    use crate::infra::{InMemoryQuizRepository, InMemoryQuizService, InMemoryStatsStore};
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, Arc<InMemoryQuizService>) {
        let service = Arc::new(QuizService::new(
            Arc::new(InMemoryQuizRepository::default()),
            Arc::new(InMemoryStatsStore::default()),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = with_quiz_routes(service.clone()).layer(Extension(state));
        (router, service)
    }

    async fn get(router: axum::Router, uri: &str) -> axum::response::Response {
        router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request builds"))
            .await
            .expect("route executes")
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (router, _) = app(false);
        assert_eq!(get(router, "/health").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_flag() {
        let (router, _) = app(false);
        assert_eq!(
            get(router, "/ready").await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        state.readiness.store(true, Ordering::Release);
        let router = axum::Router::new()
            .route("/ready", axum::routing::get(readiness_endpoint))
            .layer(Extension(state));
        assert_eq!(get(router, "/ready").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_render_as_prometheus_text() {
        let (router, _) = app(true);
        let response = get(router, "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn seeded_demo_quiz_is_publicly_reachable() {
        let (router, service) = app(true);
        let quiz = seed_demo_quiz(service.as_ref()).expect("demo quiz seeds");

        let response = get(router, &format!("/api/q/{}", quiz.slug)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::CACHE_CONTROL));
    }
}
