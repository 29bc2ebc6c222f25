use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use typequiz::error::AppError;
use typequiz::events::{DailyQuizStats, EventKind, StatsError, StatsRepository};
use typequiz::quiz::{CreatorId, Quiz, QuizId, QuizRepository, QuizService, RepositoryError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryQuizService = QuizService<InMemoryQuizRepository, InMemoryStatsStore>;

#[derive(Default, Clone)]
pub(crate) struct InMemoryQuizRepository {
    records: Arc<Mutex<HashMap<QuizId, Quiz>>>,
}

impl QuizRepository for InMemoryQuizRepository {
    fn insert(&self, quiz: Quiz) -> Result<Quiz, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&quiz.id) || guard.values().any(|stored| stored.slug == quiz.slug) {
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
        if guard
            .values()
            .any(|stored| stored.id != quiz.id && stored.slug == quiz.slug)
        {
            return Err(RepositoryError::Conflict);
        }
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

#[derive(Default, Clone)]
pub(crate) struct InMemoryStatsStore {
    rows: Arc<Mutex<BTreeMap<(QuizId, NaiveDate), DailyQuizStats>>>,
}

impl StatsRepository for InMemoryStatsStore {
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

pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
