use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Quiz, QuizId, QuizStatus, ResultType, ShareSettings};
use crate::scoring::{Axis, AxisKey, Question, Recommendation, RecommendationCondition};

/// Coarse priority shown to respondents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLabel {
    High,
    Normal,
}

impl PriorityLabel {
    pub fn from_priority(priority: i32) -> Self {
        if priority > 0 {
            Self::High
        } else {
            Self::Normal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub priority: PriorityLabel,
    pub conditions: Vec<RecommendationCondition>,
}

impl From<Recommendation> for RecommendationView {
    fn from(value: Recommendation) -> Self {
        Self {
            id: value.id,
            title: value.title,
            description: value.description,
            url: value.url,
            priority: PriorityLabel::from_priority(value.priority),
            conditions: value.conditions,
        }
    }
}

/// Respondent-facing projection of a visible quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuizView {
    pub id: QuizId,
    pub slug: String,
    pub status: QuizStatus,
    pub title: String,
    pub description: String,
    pub axes: Vec<Axis>,
    pub questions: Vec<Question>,
    pub results: Vec<ResultType>,
    pub recommendations: Vec<RecommendationView>,
    pub share: ShareSettings,
}

impl PublicQuizView {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        let definition = &quiz.definition;
        Self {
            id: quiz.id.clone(),
            slug: quiz.slug.clone(),
            status: quiz.status,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            axes: definition.axes.clone(),
            questions: definition.questions.clone(),
            results: definition.result_types.clone(),
            recommendations: definition
                .recommendations_by_priority()
                .into_iter()
                .map(RecommendationView::from)
                .collect(),
            share: quiz.share.clone(),
        }
    }
}

/// Score of one axis with its labels, ready for a percentage bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisResultView {
    pub key: AxisKey,
    pub left_label: String,
    pub right_label: String,
    pub raw_score: f64,
    pub max_score: f64,
    pub normalized: f64,
    pub percent: i64,
}

/// Outcome of a completed attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub quiz_id: QuizId,
    pub code: String,
    pub result: ResultType,
    pub axes: Vec<AxisResultView>,
    pub recommendations: Vec<RecommendationView>,
}

/// Dashboard row for a creator's quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummaryView {
    pub id: QuizId,
    pub slug: String,
    pub title: String,
    pub status: QuizStatus,
    pub axis_count: usize,
    pub question_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&Quiz> for QuizSummaryView {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            slug: quiz.slug.clone(),
            title: quiz.title.clone(),
            status: quiz.status,
            axis_count: quiz.definition.axes.len(),
            question_count: quiz.definition.questions.len(),
            updated_at: quiz.updated_at,
        }
    }
}
