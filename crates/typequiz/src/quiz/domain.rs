use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::ResultCatalog;
use crate::scoring::{
    self, Answers, Axis, Question, QuestionId, Recommendation, ScoringOutcome,
};

/// Identifier wrapper for quizzes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizId(pub String);

impl std::fmt::Display for QuizId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated creator identity supplied by the fronting proxy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatorId(pub String);

/// Publication state of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuizStatus {
    Draft,
    Public,
    Unlisted,
    Private,
}

impl QuizStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Public => "PUBLIC",
            Self::Unlisted => "UNLISTED",
            Self::Private => "PRIVATE",
        }
    }

    /// Whether respondents can open the quiz through its slug.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Public | Self::Unlisted)
    }
}

/// Catalog entry describing one result type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultType {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
}

/// Share copy chosen by the creator for the result page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSettings {
    #[serde(default)]
    pub selected_subcopy: Option<String>,
    #[serde(default)]
    pub selected_share_text: Option<String>,
}

/// Scorable part of a quiz. Axis order is canonical and fixes digit
/// positions in result codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDefinition {
    #[serde(default)]
    pub axes: Vec<Axis>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub result_types: Vec<ResultType>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

impl QuizDefinition {
    pub fn catalog(&self) -> ResultCatalog<'_> {
        ResultCatalog::new(&self.result_types)
    }

    /// Recommendations ordered by descending priority, ties in stored order.
    pub fn recommendations_by_priority(&self) -> Vec<Recommendation> {
        let mut ordered = self.recommendations.clone();
        ordered.sort_by(|a, b| b.priority.cmp(&a.priority));
        ordered
    }

    pub fn question_ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.questions.iter().map(|question| &question.id)
    }

    /// Score an answer set, filtering recommendations in priority order.
    pub fn evaluate(&self, answers: &Answers) -> ScoringOutcome {
        scoring::evaluate(
            &self.axes,
            &self.questions,
            &self.recommendations_by_priority(),
            answers,
        )
    }
}

/// Stored quiz aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: QuizId,
    pub slug: String,
    pub creator_id: CreatorId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: QuizStatus,
    #[serde(default)]
    pub definition: QuizDefinition,
    #[serde(default)]
    pub share: ShareSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quiz {
    pub fn is_owned_by(&self, creator: &CreatorId) -> bool {
        &self.creator_id == creator
    }
}
