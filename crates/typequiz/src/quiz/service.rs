use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::domain::{CreatorId, Quiz, QuizDefinition, QuizId, QuizStatus, ShareSettings};
use super::draft::{DraftError, QuizDraft};
use super::repository::{QuizRepository, RepositoryError};
use super::validation::{validate_definition, DefinitionIssue};
use super::views::{AttemptResult, AxisResultView, PublicQuizView, RecommendationView};
use crate::config::PublicCacheConfig;
use crate::events::{DailyQuizStats, EventKind, StatsError, StatsRepository};
use crate::scoring::{score_percent, Answers, QuestionId};

/// Service composing the quiz repository, definition checks, the scoring
/// engine and the engagement counters.
pub struct QuizService<R, S> {
    repository: Arc<R>,
    stats: Arc<S>,
    cache: PublicCacheConfig,
}

static QUIZ_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_sequence() -> u64 {
    QUIZ_SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

/// Editable header fields of a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicSettings {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub slug: String,
}

/// Display copy of one question. Scoring fields are not editable here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCopy {
    pub text: String,
    pub option_a: String,
    pub option_b: String,
}

/// Display copy of one result type; the code stays fixed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultTypeCopy {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl<R, S> QuizService<R, S>
where
    R: QuizRepository + 'static,
    S: StatsRepository + 'static,
{
    pub fn new(repository: Arc<R>, stats: Arc<S>) -> Self {
        Self {
            repository,
            stats,
            cache: PublicCacheConfig::default(),
        }
    }

    pub fn with_cache_policy(mut self, cache: PublicCacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache_policy(&self) -> &PublicCacheConfig {
        &self.cache
    }

    /// Create an empty draft owned by `creator`.
    pub fn create(&self, creator: &CreatorId, title: &str) -> Result<Quiz, QuizServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(QuizServiceError::InvalidInput(
                "title must not be empty".to_string(),
            ));
        }

        let (id, slug) = self.allocate_identity(title)?;
        let now = Utc::now();
        let quiz = Quiz {
            id,
            slug,
            creator_id: creator.clone(),
            title: title.to_string(),
            description: String::new(),
            status: QuizStatus::Draft,
            definition: QuizDefinition::default(),
            share: ShareSettings::default(),
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(quiz)?;
        info!(quiz_id = %stored.id, slug = %stored.slug, "quiz draft created");
        Ok(stored)
    }

    /// Quizzes owned by `creator`, newest first.
    pub fn list_for_creator(&self, creator: &CreatorId) -> Result<Vec<Quiz>, QuizServiceError> {
        let mut quizzes = self.repository.list_by_creator(creator)?;
        quizzes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(quizzes)
    }

    pub fn get_owned(&self, creator: &CreatorId, id: &QuizId) -> Result<Quiz, QuizServiceError> {
        let quiz = self
            .repository
            .fetch(id)?
            .ok_or(QuizServiceError::NotFound)?;
        if !quiz.is_owned_by(creator) {
            warn!(quiz_id = %id, "creator does not own quiz");
            return Err(QuizServiceError::NotFound);
        }
        Ok(quiz)
    }

    pub fn update_basics(
        &self,
        creator: &CreatorId,
        id: &QuizId,
        settings: BasicSettings,
    ) -> Result<Quiz, QuizServiceError> {
        let mut quiz = self.get_owned(creator, id)?;

        let title = settings.title.trim();
        if title.is_empty() {
            return Err(QuizServiceError::InvalidInput(
                "title must not be empty".to_string(),
            ));
        }
        let slug = settings.slug.trim();
        if slug.is_empty() {
            return Err(QuizServiceError::InvalidInput(
                "slug must not be empty".to_string(),
            ));
        }
        if let Some(existing) = self.repository.fetch_by_slug(slug)? {
            if existing.id != quiz.id {
                return Err(QuizServiceError::SlugTaken(slug.to_string()));
            }
        }

        quiz.title = title.to_string();
        quiz.slug = slug.to_string();
        if let Some(description) = settings.description {
            quiz.description = description;
        }
        quiz.updated_at = Utc::now();

        self.repository.update(quiz.clone())?;
        Ok(quiz)
    }

    /// Edit the prompt and option labels of one question.
    pub fn update_question(
        &self,
        creator: &CreatorId,
        id: &QuizId,
        question_id: &QuestionId,
        copy: QuestionCopy,
    ) -> Result<Quiz, QuizServiceError> {
        let mut quiz = self.get_owned(creator, id)?;

        let text = required(&copy.text, "question text")?;
        let option_a = required(&copy.option_a, "option A")?;
        let option_b = required(&copy.option_b, "option B")?;

        let question = quiz
            .definition
            .questions
            .iter_mut()
            .find(|question| &question.id == question_id)
            .ok_or(QuizServiceError::NotFound)?;
        question.text = text;
        question.option_a = option_a;
        question.option_b = option_b;
        quiz.updated_at = Utc::now();

        self.repository.update(quiz.clone())?;
        info!(quiz_id = %id, question_id = %question_id, "question copy updated");
        Ok(quiz)
    }

    /// Edit the name and description of the result type behind `code`.
    /// An omitted description keeps the stored one.
    pub fn update_result_type(
        &self,
        creator: &CreatorId,
        id: &QuizId,
        code: &str,
        copy: ResultTypeCopy,
    ) -> Result<Quiz, QuizServiceError> {
        let mut quiz = self.get_owned(creator, id)?;
        let name = required(&copy.name, "result name")?;

        let result = quiz
            .definition
            .result_types
            .iter_mut()
            .find(|result| result.code == code)
            .ok_or(QuizServiceError::NotFound)?;
        result.name = name;
        if let Some(description) = copy.description {
            result.description = description;
        }
        quiz.updated_at = Utc::now();

        self.repository.update(quiz.clone())?;
        info!(quiz_id = %id, code, "result type copy updated");
        Ok(quiz)
    }

    /// Replace the quiz definition with an imported draft.
    ///
    /// A quiz that is already visible keeps its publish invariants, so the
    /// draft must pass definition validation in that case.
    pub fn import_draft(
        &self,
        creator: &CreatorId,
        id: &QuizId,
        draft: QuizDraft,
    ) -> Result<Quiz, QuizServiceError> {
        let mut quiz = self.get_owned(creator, id)?;
        let accepted = draft.accept()?;

        if quiz.status.is_visible() {
            let issues = validate_definition(&accepted.definition);
            if !issues.is_empty() {
                warn!(quiz_id = %id, issues = issues.len(), "draft would break a live quiz");
                return Err(QuizServiceError::Incomplete(issues));
            }
        }

        quiz.title = accepted.title;
        quiz.description = accepted.description;
        quiz.definition = accepted.definition;
        quiz.updated_at = Utc::now();

        self.repository.update(quiz.clone())?;
        info!(
            quiz_id = %id,
            axes = quiz.definition.axes.len(),
            questions = quiz.definition.questions.len(),
            results = quiz.definition.result_types.len(),
            "quiz draft imported"
        );
        Ok(quiz)
    }

    /// Change the publication state. Going `PUBLIC` or `UNLISTED` requires a
    /// definition with no validation issues.
    pub fn set_status(
        &self,
        creator: &CreatorId,
        id: &QuizId,
        status: QuizStatus,
    ) -> Result<Quiz, QuizServiceError> {
        let mut quiz = self.get_owned(creator, id)?;

        if status.is_visible() {
            let issues = validate_definition(&quiz.definition);
            if !issues.is_empty() {
                warn!(quiz_id = %id, status = status.label(), issues = issues.len(), "publish refused");
                return Err(QuizServiceError::Incomplete(issues));
            }
        }

        quiz.status = status;
        quiz.updated_at = Utc::now();
        self.repository.update(quiz.clone())?;
        info!(quiz_id = %id, status = status.label(), "quiz status changed");
        Ok(quiz)
    }

    /// Quiz as shown to respondents; hidden quizzes read as not found.
    pub fn public_view(&self, slug: &str) -> Result<PublicQuizView, QuizServiceError> {
        let quiz = self.visible(slug)?;
        Ok(PublicQuizView::from_quiz(&quiz))
    }

    /// Score a complete answer set for the quiz behind `slug`.
    pub fn score_attempt(
        &self,
        slug: &str,
        answers: &Answers,
    ) -> Result<AttemptResult, QuizServiceError> {
        let quiz = self.visible(slug)?;
        let definition = &quiz.definition;

        let mut missing: Vec<QuestionId> = definition
            .question_ids()
            .filter(|id| !answers.contains_key(*id))
            .cloned()
            .collect();
        let known: HashSet<&QuestionId> = definition.question_ids().collect();
        let mut unknown: Vec<QuestionId> = answers
            .keys()
            .filter(|id| !known.contains(id))
            .cloned()
            .collect();
        if !missing.is_empty() || !unknown.is_empty() {
            missing.sort();
            unknown.sort();
            return Err(QuizServiceError::InvalidAttempt { missing, unknown });
        }

        let outcome = definition.evaluate(answers);
        let result = match definition.catalog().lookup(&outcome.code) {
            Some(result) => result.clone(),
            None => {
                warn!(quiz_id = %quiz.id, code = %outcome.code, "result catalog has no entry for code");
                return Err(QuizServiceError::ResultTypeMissing { code: outcome.code });
            }
        };

        let axes = definition
            .axes
            .iter()
            .map(|axis| {
                let score = outcome.axis_scores.get(&axis.key);
                AxisResultView {
                    key: axis.key.clone(),
                    left_label: axis.left_label.clone(),
                    right_label: axis.right_label.clone(),
                    raw_score: score.map(|score| score.raw_score).unwrap_or(0.0),
                    max_score: score.map(|score| score.max_score).unwrap_or(0.0),
                    normalized: score.map(|score| score.normalized).unwrap_or(0.0),
                    percent: score_percent(&outcome.axis_scores, &axis.key),
                }
            })
            .collect();

        Ok(AttemptResult {
            quiz_id: quiz.id.clone(),
            code: outcome.code,
            result,
            axes,
            recommendations: outcome
                .recommendations
                .into_iter()
                .map(RecommendationView::from)
                .collect(),
        })
    }

    pub fn record_event(
        &self,
        quiz_id: &QuizId,
        kind: EventKind,
    ) -> Result<DailyQuizStats, QuizServiceError> {
        self.record_event_on(quiz_id, kind, Utc::now().date_naive())
    }

    pub fn record_event_on(
        &self,
        quiz_id: &QuizId,
        kind: EventKind,
        date: NaiveDate,
    ) -> Result<DailyQuizStats, QuizServiceError> {
        if self.repository.fetch(quiz_id)?.is_none() {
            return Err(QuizServiceError::NotFound);
        }
        let row = self.stats.increment(quiz_id, kind, date)?;
        debug!(quiz_id = %quiz_id, kind = kind.label(), %date, "engagement event recorded");
        Ok(row)
    }

    /// Daily counters for a quiz owned by `creator`, oldest day first.
    pub fn stats(
        &self,
        creator: &CreatorId,
        id: &QuizId,
    ) -> Result<Vec<DailyQuizStats>, QuizServiceError> {
        let quiz = self.get_owned(creator, id)?;
        let mut rows = self.stats.daily(&quiz.id)?;
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }

    fn visible(&self, slug: &str) -> Result<Quiz, QuizServiceError> {
        match self.repository.fetch_by_slug(slug)? {
            Some(quiz) if quiz.status.is_visible() => Ok(quiz),
            _ => Err(QuizServiceError::NotFound),
        }
    }

    fn allocate_identity(&self, title: &str) -> Result<(QuizId, String), QuizServiceError> {
        let stem = slug_stem(title);
        loop {
            let sequence = next_sequence();
            let id = QuizId(format!("quiz-{sequence:06}"));
            let slug = format!("{stem}-{sequence:04}");
            if self.repository.fetch(&id)?.is_none()
                && self.repository.fetch_by_slug(&slug)?.is_none()
            {
                return Ok((id, slug));
            }
        }
    }
}

fn required(value: &str, field: &str) -> Result<String, QuizServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(QuizServiceError::InvalidInput(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value.to_string())
}

/// Lowercase ASCII stem of a title; `quiz` when nothing usable remains.
fn slug_stem(title: &str) -> String {
    let mut stem = String::new();
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            stem.push(ch.to_ascii_lowercase());
        } else if !stem.is_empty() && !stem.ends_with('-') {
            stem.push('-');
        }
    }
    let stem = stem.trim_end_matches('-');
    let stem: String = stem.chars().take(40).collect();
    let stem = stem.trim_end_matches('-');
    if stem.is_empty() {
        "quiz".to_string()
    } else {
        stem.to_string()
    }
}

/// Error raised by the quiz service.
#[derive(Debug, thiserror::Error)]
pub enum QuizServiceError {
    #[error("quiz not found")]
    NotFound,
    #[error("{0}")]
    InvalidInput(String),
    #[error("slug '{0}' is already in use")]
    SlugTaken(String),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("quiz definition has {} unresolved issue(s)", .0.len())]
    Incomplete(Vec<DefinitionIssue>),
    #[error(
        "attempt must answer every question: {} unanswered, {} unknown",
        .missing.len(),
        .unknown.len()
    )]
    InvalidAttempt {
        missing: Vec<QuestionId>,
        unknown: Vec<QuestionId>,
    },
    #[error("no result type covers code '{code}'")]
    ResultTypeMissing { code: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}
