use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{Answers, Axis, AxisKey, Question};

/// Aggregated score for one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScore {
    pub key: AxisKey,
    pub raw_score: f64,
    pub max_score: f64,
    /// `raw_score / max_score`, in `[-1.0, 1.0]`; 0 when nothing was answered.
    pub normalized: f64,
}

impl AxisScore {
    fn empty(key: AxisKey) -> Self {
        Self {
            key,
            raw_score: 0.0,
            max_score: 0.0,
            normalized: 0.0,
        }
    }
}

/// Scores per axis key.
pub type AxisScores = BTreeMap<AxisKey, AxisScore>;

/// Aggregate the answered questions into one score per axis.
///
/// Every axis in `axes` appears in the output. Unanswered questions are
/// skipped and questions pointing at an axis outside `axes` are ignored.
pub fn compute_axis_scores(questions: &[Question], answers: &Answers, axes: &[Axis]) -> AxisScores {
    let mut scores: AxisScores = axes
        .iter()
        .map(|axis| (axis.key.clone(), AxisScore::empty(axis.key.clone())))
        .collect();

    for question in questions {
        let Some(answer) = answers.get(&question.id) else {
            continue;
        };
        let Some(score) = scores.get_mut(&question.axis_key) else {
            continue;
        };

        let weight = question.effective_weight();
        score.raw_score += f64::from(answer.value()) * weight * question.a_side.direction();
        score.max_score += 2.0 * weight;
    }

    for score in scores.values_mut() {
        score.normalized = if score.max_score > 0.0 {
            score.raw_score / score.max_score
        } else {
            0.0
        };
    }

    scores
}
