use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::axis::AxisScores;
use super::model::AxisKey;

/// Comparison applied between an axis percentage and a threshold.
///
/// Unrecognised operator strings, and a missing operator, behave as
/// [`ConditionOperator::Gte`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConditionOperator {
    #[default]
    Gte,
    Lte,
    Eq,
}

impl ConditionOperator {
    pub fn from_label(label: &str) -> Self {
        match label {
            "lte" => Self::Lte,
            "eq" => Self::Eq,
            _ => Self::Gte,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Eq => "eq",
        }
    }

    pub fn holds(self, score_percent: i64, threshold: i64) -> bool {
        match self {
            Self::Gte => score_percent >= threshold,
            Self::Lte => score_percent <= threshold,
            Self::Eq => score_percent == threshold,
        }
    }
}

impl Serialize for ConditionOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ConditionOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .map(Self::from_label)
            .unwrap_or_default())
    }
}

/// Threshold test against one axis, expressed in whole percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCondition {
    pub axis_key: AxisKey,
    pub threshold: i64,
    #[serde(default)]
    pub operator: ConditionOperator,
}

impl RecommendationCondition {
    pub fn is_satisfied(&self, axis_scores: &AxisScores) -> bool {
        let score_percent = score_percent(axis_scores, &self.axis_key);
        self.operator.holds(score_percent, self.threshold)
    }
}

/// Content suggested to respondents whose scores satisfy every condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub conditions: Vec<RecommendationCondition>,
}

impl Recommendation {
    pub fn is_eligible(&self, axis_scores: &AxisScores) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.is_satisfied(axis_scores))
    }
}

/// Normalized score of `axis_key` as a whole percentage.
///
/// Rounds half away from zero (`f64::round`), so 0.125 becomes 13 and
/// -0.125 becomes -13. A missing axis reads as 0.
pub fn score_percent(axis_scores: &AxisScores, axis_key: &AxisKey) -> i64 {
    let normalized = axis_scores
        .get(axis_key)
        .map(|score| score.normalized)
        .unwrap_or(0.0);
    (normalized * 100.0).round() as i64
}

/// Keep the recommendations whose conditions all hold, preserving input order.
pub fn filter_recommendations(
    recommendations: &[Recommendation],
    axis_scores: &AxisScores,
) -> Vec<Recommendation> {
    recommendations
        .iter()
        .filter(|recommendation| recommendation.is_eligible(axis_scores))
        .cloned()
        .collect()
}
