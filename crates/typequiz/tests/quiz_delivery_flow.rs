//! Integration scenarios for the creator publishing flow and the respondent
//! delivery flow, driven only through the public router.

mod common {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::response::Response;
    use chrono::NaiveDate;
    use serde_json::Value;

    use typequiz::events::{DailyQuizStats, EventKind, StatsError, StatsRepository};
    use typequiz::quiz::{
        quiz_router, CreatorId, Quiz, QuizId, QuizRepository, QuizService, RepositoryError,
        CREATOR_HEADER,
    };

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        records: Mutex<HashMap<QuizId, Quiz>>,
    }

    impl QuizRepository for MemoryRepository {
        fn insert(&self, quiz: Quiz) -> Result<Quiz, RepositoryError> {
            let mut guard = self.records.lock().expect("repository mutex poisoned");
            if guard.contains_key(&quiz.id) || guard.values().any(|q| q.slug == quiz.slug) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(quiz.id.clone(), quiz.clone());
            Ok(quiz)
        }

        fn update(&self, quiz: Quiz) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("repository mutex poisoned");
            guard.insert(quiz.id.clone(), quiz);
            Ok(())
        }

        fn fetch(&self, id: &QuizId) -> Result<Option<Quiz>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(guard.get(id).cloned())
        }

        fn fetch_by_slug(&self, slug: &str) -> Result<Option<Quiz>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(guard.values().find(|quiz| quiz.slug == slug).cloned())
        }

        fn list_by_creator(&self, creator: &CreatorId) -> Result<Vec<Quiz>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(guard
                .values()
                .filter(|quiz| quiz.is_owned_by(creator))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryStats {
        rows: Mutex<BTreeMap<(QuizId, NaiveDate), DailyQuizStats>>,
    }

    impl StatsRepository for MemoryStats {
        fn increment(
            &self,
            quiz_id: &QuizId,
            kind: EventKind,
            date: NaiveDate,
        ) -> Result<DailyQuizStats, StatsError> {
            let mut guard = self.rows.lock().expect("stats mutex poisoned");
            let row = guard
                .entry((quiz_id.clone(), date))
                .or_insert_with(|| DailyQuizStats::new(quiz_id.clone(), date));
            row.increment(kind);
            Ok(row.clone())
        }

        fn daily(&self, quiz_id: &QuizId) -> Result<Vec<DailyQuizStats>, StatsError> {
            let guard = self.rows.lock().expect("stats mutex poisoned");
            Ok(guard
                .values()
                .filter(|row| &row.quiz_id == quiz_id)
                .cloned()
                .collect())
        }
    }

    pub(super) fn router() -> axum::Router {
        let service = QuizService::new(
            Arc::new(MemoryRepository::default()),
            Arc::new(MemoryStats::default()),
        );
        quiz_router(Arc::new(service))
    }

    pub(super) fn request(
        method: &str,
        uri: &str,
        creator: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(creator) = creator {
            builder = builder.header(CREATOR_HEADER, creator);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).expect("json body")))
                .expect("request builds"),
            None => builder.body(Body::empty()).expect("request builds"),
        }
    }

    pub(super) async fn read_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }
}

use axum::http::{header, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;

const CREATOR: &str = "creator-42";

fn draft() -> Value {
    json!({
        "title": "Which Café Regular Are You?",
        "description": "Five quick picks.",
        "axes": [
            { "key": "E", "leftLabel": "Quiet corner", "rightLabel": "Counter chat" },
            { "key": "P", "leftLabel": "Usual order", "rightLabel": "Seasonal special" }
        ],
        "results": [
            { "code": "00", "name": "The Regular", "description": "Same seat, same cup." },
            { "code": "01", "name": "The Taster", "description": "Quiet but curious." },
            { "code": "10", "name": "The Host", "description": "Knows every barista." },
            { "code": "11", "name": "The Scout", "description": "First to try anything." }
        ],
        "questions": [
            { "text": "Where do you sit?", "optionA": "Window", "optionB": "Bar", "axis": "E" },
            { "text": "Small talk?", "optionA": "Rarely", "optionB": "Always", "axis": "E", "weight": 2 },
            { "text": "New menu item?", "optionA": "Try it", "optionB": "Skip it", "axis": "P", "aSide": "RIGHT" },
            { "text": "Same drink daily?", "optionA": "Yes", "optionB": "No", "axis": "P" },
            { "text": "Group visits?", "optionA": "Solo", "optionB": "Friends", "axis": "E" }
        ],
        "recommendations": [
            {
                "id": "tasting-flight",
                "title": "Order a tasting flight",
                "priority": 1,
                "conditions": [{ "axisKey": "P", "threshold": 50, "operator": "gte" }]
            }
        ]
    })
}

#[tokio::test]
async fn creator_publishes_and_respondent_completes_quiz() {
    let router = router();

    let created = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/quizzes",
            Some(CREATOR),
            Some(json!({ "title": "Café regulars" })),
        ))
        .await
        .expect("create executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = read_json(created).await;
    let quiz_id = created["id"].as_str().expect("id").to_string();

    let imported = router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/quizzes/{quiz_id}/draft"),
            Some(CREATOR),
            Some(draft()),
        ))
        .await
        .expect("import executes");
    assert_eq!(imported.status(), StatusCode::OK);
    let imported = read_json(imported).await;
    assert_eq!(imported["questionCount"], 5);
    assert_eq!(imported["axisCount"], 2);

    let renamed = router
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/quizzes/{quiz_id}"),
            Some(CREATOR),
            Some(json!({ "title": "Which Café Regular Are You?", "slug": "cafe-regular" })),
        ))
        .await
        .expect("rename executes");
    assert_eq!(renamed.status(), StatusCode::OK);

    // Still a draft: invisible to respondents.
    let hidden = router
        .clone()
        .oneshot(request("GET", "/api/q/cafe-regular", None, None))
        .await
        .expect("fetch executes");
    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

    let published = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/quizzes/{quiz_id}/publish"),
            Some(CREATOR),
            Some(json!({ "status": "PUBLIC" })),
        ))
        .await
        .expect("publish executes");
    assert_eq!(published.status(), StatusCode::OK);

    let public = router
        .clone()
        .oneshot(request("GET", "/api/q/cafe-regular", None, None))
        .await
        .expect("fetch executes");
    assert_eq!(public.status(), StatusCode::OK);
    assert_eq!(
        public.headers()[header::CACHE_CONTROL],
        "public, s-maxage=60, stale-while-revalidate=300"
    );
    let public = read_json(public).await;
    let ids: Vec<String> = public["questions"]
        .as_array()
        .expect("questions")
        .iter()
        .map(|question| question["id"].as_str().expect("id").to_string())
        .collect();
    assert_eq!(ids, vec!["q-1", "q-2", "q-3", "q-4", "q-5"]);

    // E: q-1 (+1 * -1), q-2 (+2 * -2), q-5 (+1 * 0) = -5 over 8.
    // P: q-3 (-1 * -2), q-4 (+1 * 2) = 4 over 4.
    let result = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/q/cafe-regular/result",
            None,
            Some(json!({ "answers": { "q-1": -1, "q-2": -2, "q-3": -2, "q-4": 2, "q-5": 0 } })),
        ))
        .await
        .expect("score executes");
    assert_eq!(result.status(), StatusCode::OK);
    let result = read_json(result).await;
    assert_eq!(result["code"], "01");
    assert_eq!(result["result"]["name"], "The Taster");
    assert_eq!(result["axes"][0]["normalized"], -0.625);
    assert_eq!(result["axes"][0]["percent"], -63);
    assert_eq!(result["axes"][1]["percent"], 100);
    assert_eq!(result["recommendations"][0]["id"], "tasting-flight");

    for kind in ["view", "start", "complete", "reco_click"] {
        let event = router
            .clone()
            .oneshot(request(
                "POST",
                "/api/events",
                None,
                Some(json!({ "quizId": quiz_id, "type": kind })),
            ))
            .await
            .expect("event executes");
        assert_eq!(event.status(), StatusCode::OK);
    }

    let stats = router
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/v1/quizzes/{quiz_id}/stats"),
            Some(CREATOR),
            None,
        ))
        .await
        .expect("stats executes");
    assert_eq!(stats.status(), StatusCode::OK);
    let stats = read_json(stats).await;
    assert_eq!(stats[0]["views"], 1);
    assert_eq!(stats[0]["completes"], 1);
    assert_eq!(stats[0]["recoClick"], 1);
    assert_eq!(stats[0]["shareCopy"], 0);

    let foreign = router
        .oneshot(request(
            "GET",
            &format!("/api/v1/quizzes/{quiz_id}/stats"),
            Some("someone-else"),
            None,
        ))
        .await
        .expect("stats executes");
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_draft_is_refused() {
    let router = router();
    let created = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/quizzes",
            Some(CREATOR),
            Some(json!({ "title": "Too short" })),
        ))
        .await
        .expect("create executes");
    let quiz_id = read_json(created).await["id"]
        .as_str()
        .expect("id")
        .to_string();

    let mut short = draft();
    short["questions"]
        .as_array_mut()
        .expect("questions")
        .truncate(3);

    let response = router
        .oneshot(request(
            "PUT",
            &format!("/api/v1/quizzes/{quiz_id}/draft"),
            Some(CREATOR),
            Some(short),
        ))
        .await
        .expect("import executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_event_type_is_a_client_error() {
    let response = router()
        .oneshot(request(
            "POST",
            "/api/events",
            None,
            Some(json!({ "quizId": "quiz-x", "type": "teleport" })),
        ))
        .await
        .expect("event executes");
    assert!(response.status().is_client_error());
}
