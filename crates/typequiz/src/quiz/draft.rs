use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{QuizDefinition, ResultType};
use super::validation::{MAX_AXES, MIN_AXES};
use crate::scoring::{Axis, AxisKey, Polarity, Question, QuestionId, Recommendation};

pub const MIN_DRAFT_QUESTIONS: usize = 5;

/// Structured quiz draft, the shape returned by the generation helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub title: String,
    pub description: String,
    pub axes: Vec<Axis>,
    pub results: Vec<DraftResult>,
    pub questions: Vec<DraftQuestion>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResult {
    pub code: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftQuestion {
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub axis: AxisKey,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub a_side: Option<Polarity>,
}

/// Structural problems that make a draft unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("draft title must not be empty")]
    EmptyTitle,
    #[error("draft needs between 2 and 4 axes, found {0}")]
    AxisCount(usize),
    #[error("draft needs at least 5 questions, found {0}")]
    TooFewQuestions(usize),
    #[error("draft question {index} references unknown axis '{axis}'")]
    UnknownAxis { index: usize, axis: AxisKey },
}

/// Definition and display fields extracted from an accepted draft.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedDraft {
    pub title: String,
    pub description: String,
    pub definition: QuizDefinition,
}

impl QuizDraft {
    /// Check the draft shape and convert it into a quiz definition.
    ///
    /// Questions receive ids `q-1`, `q-2`, ... in draft order; a missing
    /// weight becomes 1 and a missing `aSide` means option A is the left pole.
    pub fn accept(self) -> Result<AcceptedDraft, DraftError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        if !(MIN_AXES..=MAX_AXES).contains(&self.axes.len()) {
            return Err(DraftError::AxisCount(self.axes.len()));
        }
        if self.questions.len() < MIN_DRAFT_QUESTIONS {
            return Err(DraftError::TooFewQuestions(self.questions.len()));
        }

        let axis_keys: HashSet<&AxisKey> = self.axes.iter().map(|axis| &axis.key).collect();
        if let Some((index, question)) = self
            .questions
            .iter()
            .enumerate()
            .find(|(_, question)| !axis_keys.contains(&question.axis))
        {
            return Err(DraftError::UnknownAxis {
                index: index + 1,
                axis: question.axis.clone(),
            });
        }

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, question)| Question {
                id: QuestionId(format!("q-{}", index + 1)),
                axis_key: question.axis,
                a_side: question.a_side.unwrap_or_default(),
                weight: question.weight.unwrap_or(1.0),
                text: question.text,
                option_a: question.option_a,
                option_b: question.option_b,
            })
            .collect();

        let result_types = self
            .results
            .into_iter()
            .map(|result| ResultType {
                code: result.code,
                name: result.name,
                tagline: String::new(),
                description: result.description,
            })
            .collect();

        Ok(AcceptedDraft {
            title,
            description: self.description,
            definition: QuizDefinition {
                axes: self.axes,
                questions,
                result_types,
                recommendations: self.recommendations,
            },
        })
    }
}
