//! Pure scoring engine: axis aggregation, result code derivation and
//! recommendation filtering.
//!
//! Everything here is synchronous and total. Inputs are borrowed snapshots of
//! a quiz definition; nothing is cached or mutated between calls.

mod axis;
mod code;
mod model;
mod recommend;

pub use axis::{compute_axis_scores, AxisScore, AxisScores};
pub use code::compute_result_code;
pub use model::{
    AnswerValue, Answers, Axis, AxisKey, InvalidAnswer, Polarity, Question, QuestionId,
};
pub use recommend::{
    filter_recommendations, score_percent, ConditionOperator, Recommendation,
    RecommendationCondition,
};

use serde::Serialize;

/// Combined output of one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringOutcome {
    pub axis_scores: AxisScores,
    pub code: String,
    pub recommendations: Vec<Recommendation>,
}

/// Run the three engine stages in order.
///
/// `recommendations` are filtered in the order given; callers that want
/// priority ordering sort before calling.
pub fn evaluate(
    axes: &[Axis],
    questions: &[Question],
    recommendations: &[Recommendation],
    answers: &Answers,
) -> ScoringOutcome {
    let axis_scores = compute_axis_scores(questions, answers, axes);
    let code = compute_result_code(&axis_scores, axes);
    let recommendations = filter_recommendations(recommendations, &axis_scores);

    ScoringOutcome {
        axis_scores,
        code,
        recommendations,
    }
}
