use std::collections::HashSet;

use super::domain::QuizDefinition;
use crate::scoring::{AxisKey, QuestionId};

pub const MIN_AXES: usize = 2;
pub const MAX_AXES: usize = 4;
pub const MAX_THRESHOLD: i64 = 100;

/// Problem that keeps a definition from being published.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionIssue {
    #[error("quiz needs between 2 and 4 axes, found {count}")]
    AxisCount { count: usize },
    #[error("axis key '{key}' is defined more than once")]
    DuplicateAxis { key: AxisKey },
    #[error("quiz has no questions")]
    NoQuestions,
    #[error("question '{question_id}' references unknown axis '{axis_key}'")]
    UnknownQuestionAxis {
        question_id: QuestionId,
        axis_key: AxisKey,
    },
    #[error("question '{question_id}' has invalid weight {weight}")]
    InvalidWeight { question_id: QuestionId, weight: f64 },
    #[error("no result type covers code '{code}'")]
    MissingResultType { code: String },
    #[error("recommendation '{recommendation_id}' has a condition on unknown axis '{axis_key}'")]
    UnknownConditionAxis {
        recommendation_id: String,
        axis_key: AxisKey,
    },
    #[error("recommendation '{recommendation_id}' has threshold {threshold} outside -100..=100")]
    ThresholdOutOfRange {
        recommendation_id: String,
        threshold: i64,
    },
}

/// Check the upstream invariants the scoring engine relies on but does not
/// enforce itself. An empty result means the definition can go live.
pub fn validate_definition(definition: &QuizDefinition) -> Vec<DefinitionIssue> {
    let mut issues = Vec::new();

    let axis_count = definition.axes.len();
    if !(MIN_AXES..=MAX_AXES).contains(&axis_count) {
        issues.push(DefinitionIssue::AxisCount { count: axis_count });
    }

    let mut axis_keys = HashSet::new();
    for axis in &definition.axes {
        if !axis_keys.insert(&axis.key) {
            issues.push(DefinitionIssue::DuplicateAxis {
                key: axis.key.clone(),
            });
        }
    }

    if definition.questions.is_empty() {
        issues.push(DefinitionIssue::NoQuestions);
    }

    for question in &definition.questions {
        if !axis_keys.contains(&question.axis_key) {
            issues.push(DefinitionIssue::UnknownQuestionAxis {
                question_id: question.id.clone(),
                axis_key: question.axis_key.clone(),
            });
        }
        if !question.weight.is_finite() || question.weight <= 0.0 {
            issues.push(DefinitionIssue::InvalidWeight {
                question_id: question.id.clone(),
                weight: question.weight,
            });
        }
    }

    issues.extend(
        definition
            .catalog()
            .missing_codes(axis_count)
            .into_iter()
            .map(|code| DefinitionIssue::MissingResultType { code }),
    );

    for recommendation in &definition.recommendations {
        for condition in &recommendation.conditions {
            if !axis_keys.contains(&condition.axis_key) {
                issues.push(DefinitionIssue::UnknownConditionAxis {
                    recommendation_id: recommendation.id.clone(),
                    axis_key: condition.axis_key.clone(),
                });
            }
            if !(-MAX_THRESHOLD..=MAX_THRESHOLD).contains(&condition.threshold) {
                issues.push(DefinitionIssue::ThresholdOutOfRange {
                    recommendation_id: recommendation.id.clone(),
                    threshold: condition.threshold,
                });
            }
        }
    }

    issues
}
