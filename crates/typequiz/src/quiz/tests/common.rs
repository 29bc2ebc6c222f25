use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::events::{DailyQuizStats, EventKind, StatsError, StatsRepository};
use crate::quiz::domain::{
    CreatorId, Quiz, QuizDefinition, QuizId, QuizStatus, ResultType, ShareSettings,
};
use crate::quiz::repository::{QuizRepository, RepositoryError};
use crate::quiz::{quiz_router, QuizService};
use crate::scoring::{
    AnswerValue, Answers, Axis, AxisKey, ConditionOperator, Polarity, Question, QuestionId,
    Recommendation, RecommendationCondition,
};

pub(super) const OWNER: &str = "creator-1";
pub(super) const SLUG: &str = "weekend-style";

pub(super) fn owner() -> CreatorId {
    CreatorId(OWNER.to_string())
}

pub(super) fn axis(key: &str, left: &str, right: &str) -> Axis {
    Axis {
        key: AxisKey::new(key),
        left_label: left.to_string(),
        right_label: right.to_string(),
    }
}

pub(super) fn question(id: &str, axis_key: &str, a_side: Polarity) -> Question {
    Question {
        id: QuestionId::new(id),
        axis_key: AxisKey::new(axis_key),
        a_side,
        weight: 1.0,
        text: format!("Prompt {id}"),
        option_a: "A".to_string(),
        option_b: "B".to_string(),
    }
}

fn result_type(code: &str, name: &str) -> ResultType {
    ResultType {
        code: code.to_string(),
        name: name.to_string(),
        tagline: String::new(),
        description: format!("{name} description"),
    }
}

/// Two axes, two questions each, fully covered catalog.
pub(super) fn definition() -> QuizDefinition {
    QuizDefinition {
        axes: vec![
            axis("X", "Homebody", "Explorer"),
            axis("Y", "Planner", "Improviser"),
        ],
        questions: vec![
            question("qx1", "X", Polarity::LeftIsA),
            question("qx2", "X", Polarity::RightIsA),
            question("qy1", "Y", Polarity::LeftIsA),
            question("qy2", "Y", Polarity::RightIsA),
        ],
        result_types: vec![
            result_type("00", "Quiet Planner"),
            result_type("01", "Cozy Improviser"),
            result_type("10", "Mapped Explorer"),
            result_type("11", "Free Spirit"),
        ],
        recommendations: vec![
            Recommendation {
                id: "reco-explore".to_string(),
                title: "Book a trip".to_string(),
                description: None,
                url: Some("https://example.test/trip".to_string()),
                priority: 0,
                conditions: vec![RecommendationCondition {
                    axis_key: AxisKey::new("X"),
                    threshold: 0,
                    operator: ConditionOperator::Gte,
                }],
            },
            Recommendation {
                id: "reco-plan".to_string(),
                title: "Try a planner".to_string(),
                description: Some("Keep a paper agenda".to_string()),
                url: None,
                priority: 3,
                conditions: vec![RecommendationCondition {
                    axis_key: AxisKey::new("Y"),
                    threshold: 50,
                    operator: ConditionOperator::Gte,
                }],
            },
        ],
    }
}

/// Answers producing X = -0.75, Y = 0.5, code "01".
pub(super) fn answers() -> Answers {
    HashMap::from([
        (QuestionId::new("qx1"), AnswerValue::StronglyA),
        (QuestionId::new("qx2"), AnswerValue::LeanB),
        (QuestionId::new("qy1"), AnswerValue::LeanB),
        (QuestionId::new("qy2"), AnswerValue::LeanA),
    ])
}

pub(super) fn answers_json() -> Value {
    serde_json::json!({ "answers": { "qx1": -2, "qx2": 1, "qy1": 1, "qy2": -1 } })
}

pub(super) fn stored_quiz(id: &str, slug: &str, status: QuizStatus) -> Quiz {
    let now = Utc::now();
    Quiz {
        id: QuizId(id.to_string()),
        slug: slug.to_string(),
        creator_id: owner(),
        title: "Weekend Style".to_string(),
        description: "Which weekend suits you?".to_string(),
        status,
        definition: definition(),
        share: ShareSettings::default(),
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn build_service() -> (
    QuizService<MemoryRepository, MemoryStats>,
    Arc<MemoryRepository>,
    Arc<MemoryStats>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let stats = Arc::new(MemoryStats::default());
    let service = QuizService::new(repository.clone(), stats.clone());
    (service, repository, stats)
}

/// Service with one stored quiz under [`SLUG`].
pub(super) fn seeded_service(
    status: QuizStatus,
) -> (
    QuizService<MemoryRepository, MemoryStats>,
    Arc<MemoryRepository>,
    Arc<MemoryStats>,
) {
    let (service, repository, stats) = build_service();
    repository
        .insert(stored_quiz("quiz-seeded", SLUG, status))
        .expect("seed insert succeeds");
    (service, repository, stats)
}

pub(super) fn router_with_service(
    service: QuizService<MemoryRepository, MemoryStats>,
) -> axum::Router {
    quiz_router(Arc::new(service))
}

pub(super) fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<QuizId, Quiz>>>,
}

impl MemoryRepository {
    pub(super) fn get(&self, id: &QuizId) -> Option<Quiz> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }
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
        if !guard.contains_key(&quiz.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(quiz.id.clone(), quiz);
        Ok(())
    }

    fn fetch(&self, id: &QuizId) -> Result<Option<Quiz>, RepositoryError> {
        Ok(self.get(id))
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

#[derive(Default, Clone)]
pub(super) struct MemoryStats {
    rows: Arc<Mutex<BTreeMap<(QuizId, NaiveDate), DailyQuizStats>>>,
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

pub(super) struct UnavailableRepository;

impl QuizRepository for UnavailableRepository {
    fn insert(&self, _quiz: Quiz) -> Result<Quiz, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _quiz: Quiz) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &QuizId) -> Result<Option<Quiz>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_by_slug(&self, _slug: &str) -> Result<Option<Quiz>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_by_creator(&self, _creator: &CreatorId) -> Result<Vec<Quiz>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
