use super::axis::AxisScores;
use super::model::Axis;

/// Derive the result code: one digit per axis in definition order, `0` when
/// the axis leans left (`normalized < 0`) and `1` otherwise.
pub fn compute_result_code(axis_scores: &AxisScores, axes: &[Axis]) -> String {
    axes.iter()
        .map(|axis| {
            let normalized = axis_scores
                .get(&axis.key)
                .map(|score| score.normalized)
                .unwrap_or(0.0);
            if normalized < 0.0 {
                '0'
            } else {
                '1'
            }
        })
        .collect()
}
