use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CreatorId, QuizId, QuizStatus};
use super::draft::QuizDraft;
use super::repository::{QuizRepository, RepositoryError};
use super::service::{
    BasicSettings, QuestionCopy, QuizService, QuizServiceError, ResultTypeCopy,
};
use super::views::QuizSummaryView;
use crate::events::{EventKind, StatsRepository};
use crate::scoring::{Answers, QuestionId};

/// Header carrying the creator identity resolved by the fronting proxy.
pub const CREATOR_HEADER: &str = "x-creator-id";

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) answers: Answers,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventRequest {
    pub(crate) quiz_id: QuizId,
    #[serde(rename = "type")]
    pub(crate) kind: EventKind,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateQuizRequest {
    pub(crate) title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    pub(crate) status: QuizStatus,
}

/// Router builder exposing the public delivery flow and the creator API.
pub fn quiz_router<R, S>(service: Arc<QuizService<R, S>>) -> Router
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    Router::new()
        .route("/api/q/:slug", get(public_quiz_handler::<R, S>))
        .route("/api/q/:slug/result", post(score_handler::<R, S>))
        .route("/api/events", post(event_handler::<R, S>))
        .route(
            "/api/v1/quizzes",
            get(list_handler::<R, S>).post(create_handler::<R, S>),
        )
        .route("/api/v1/quizzes/:quiz_id", patch(update_basics_handler::<R, S>))
        .route(
            "/api/v1/quizzes/:quiz_id/questions/:question_id",
            patch(update_question_handler::<R, S>),
        )
        .route(
            "/api/v1/quizzes/:quiz_id/results/:code",
            patch(update_result_type_handler::<R, S>),
        )
        .route(
            "/api/v1/quizzes/:quiz_id/draft",
            put(import_draft_handler::<R, S>),
        )
        .route(
            "/api/v1/quizzes/:quiz_id/publish",
            post(publish_handler::<R, S>),
        )
        .route("/api/v1/quizzes/:quiz_id/stats", get(stats_handler::<R, S>))
        .with_state(service)
}

pub(crate) async fn public_quiz_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    Path(slug): Path<String>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    match service.public_view(&slug) {
        Ok(view) => {
            let headers = cache_headers(service.cache_policy().header_value(), view.status);
            (StatusCode::OK, headers, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    Path(slug): Path<String>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    match service.score_attempt(&slug, &request.answers) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn event_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    axum::Json(request): axum::Json<EventRequest>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    match service.record_event(&request.quiz_id, request.kind) {
        Ok(_) => (StatusCode::OK, axum::Json(json!({ "success": true }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    headers: HeaderMap,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = match creator_from(&headers) {
        Ok(creator) => creator,
        Err(response) => return response,
    };

    match service.list_for_creator(&creator) {
        Ok(quizzes) => {
            let rows: Vec<QuizSummaryView> = quizzes.iter().map(QuizSummaryView::from).collect();
            (StatusCode::OK, axum::Json(rows)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateQuizRequest>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = match creator_from(&headers) {
        Ok(creator) => creator,
        Err(response) => return response,
    };

    match service.create(&creator, &request.title) {
        Ok(quiz) => (
            StatusCode::CREATED,
            axum::Json(QuizSummaryView::from(&quiz)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_basics_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    Path(quiz_id): Path<String>,
    headers: HeaderMap,
    axum::Json(settings): axum::Json<BasicSettings>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = match creator_from(&headers) {
        Ok(creator) => creator,
        Err(response) => return response,
    };

    match service.update_basics(&creator, &QuizId(quiz_id), settings) {
        Ok(quiz) => (StatusCode::OK, axum::Json(QuizSummaryView::from(&quiz))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_question_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    Path((quiz_id, question_id)): Path<(String, String)>,
    headers: HeaderMap,
    axum::Json(copy): axum::Json<QuestionCopy>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = match creator_from(&headers) {
        Ok(creator) => creator,
        Err(response) => return response,
    };

    let quiz_id = QuizId(quiz_id);
    let question_id = QuestionId(question_id);
    match service.update_question(&creator, &quiz_id, &question_id, copy) {
        Ok(quiz) => (StatusCode::OK, axum::Json(QuizSummaryView::from(&quiz))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_result_type_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    Path((quiz_id, code)): Path<(String, String)>,
    headers: HeaderMap,
    axum::Json(copy): axum::Json<ResultTypeCopy>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = match creator_from(&headers) {
        Ok(creator) => creator,
        Err(response) => return response,
    };

    match service.update_result_type(&creator, &QuizId(quiz_id), &code, copy) {
        Ok(quiz) => (StatusCode::OK, axum::Json(QuizSummaryView::from(&quiz))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_draft_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    Path(quiz_id): Path<String>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<QuizDraft>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = match creator_from(&headers) {
        Ok(creator) => creator,
        Err(response) => return response,
    };

    match service.import_draft(&creator, &QuizId(quiz_id), draft) {
        Ok(quiz) => (StatusCode::OK, axum::Json(QuizSummaryView::from(&quiz))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn publish_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    Path(quiz_id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<StatusRequest>,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = match creator_from(&headers) {
        Ok(creator) => creator,
        Err(response) => return response,
    };

    match service.set_status(&creator, &QuizId(quiz_id), request.status) {
        Ok(quiz) => {
            let payload = json!({ "success": true, "status": quiz.status });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<R, S>(
    State(service): State<Arc<QuizService<R, S>>>,
    Path(quiz_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    let creator = match creator_from(&headers) {
        Ok(creator) => creator,
        Err(response) => return response,
    };

    match service.stats(&creator, &QuizId(quiz_id)) {
        Ok(rows) => (StatusCode::OK, axum::Json(rows)).into_response(),
        Err(error) => error_response(error),
    }
}

fn creator_from(headers: &HeaderMap) -> Result<CreatorId, Response> {
    headers
        .get(CREATOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| CreatorId(value.to_string()))
        .ok_or_else(|| {
            let payload = json!({ "error": "Unauthorized" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        })
}

/// `PUBLIC` quizzes are shared-cacheable; `UNLISTED` ones stay out of caches
/// and search indexes.
fn cache_headers(public_cache_control: String, status: QuizStatus) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match status {
        QuizStatus::Public => {
            if let Ok(value) = HeaderValue::from_str(&public_cache_control) {
                headers.insert(header::CACHE_CONTROL, value);
            }
        }
        QuizStatus::Unlisted => {
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static("private, no-store"),
            );
            headers.insert("x-robots-tag", HeaderValue::from_static("noindex, nofollow"));
        }
        QuizStatus::Draft | QuizStatus::Private => {}
    }
    headers
}

fn error_response(error: QuizServiceError) -> Response {
    let message = error.to_string();
    match error {
        QuizServiceError::NotFound | QuizServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "Not Found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        QuizServiceError::InvalidInput(_) | QuizServiceError::Draft(_) => {
            let payload = json!({ "error": message });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        QuizServiceError::Incomplete(issues) => {
            let issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
            let payload = json!({ "error": message, "issues": issues });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        QuizServiceError::InvalidAttempt { missing, unknown } => {
            let payload = json!({ "error": message, "missing": missing, "unknown": unknown });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        QuizServiceError::SlugTaken(_)
        | QuizServiceError::ResultTypeMissing { .. }
        | QuizServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": message });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        QuizServiceError::Repository(_) | QuizServiceError::Stats(_) => {
            let payload = json!({ "error": message });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
