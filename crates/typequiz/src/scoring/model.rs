use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Stable identifier of an axis, unique within a quiz.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisKey(pub String);

impl AxisKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl std::fmt::Display for AxisKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for questions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One bipolar dimension of a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub key: AxisKey,
    pub left_label: String,
    pub right_label: String,
}

/// Which pole of the axis option A stands for.
///
/// Stored definitions carry this as a boolean (`true` means A is the left
/// pole) while the public transport uses the `"LEFT"`/`"RIGHT"` labels. Both
/// encodings deserialize into this type; any label other than `"LEFT"` reads
/// as [`Polarity::RightIsA`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Polarity {
    #[default]
    LeftIsA,
    RightIsA,
}

impl Polarity {
    pub fn from_flag(a_is_left: bool) -> Self {
        if a_is_left {
            Self::LeftIsA
        } else {
            Self::RightIsA
        }
    }

    pub fn from_label(label: &str) -> Self {
        Self::from_flag(label == "LEFT")
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LeftIsA => "LEFT",
            Self::RightIsA => "RIGHT",
        }
    }

    /// Multiplier applied to an answer so that negative totals lean left.
    pub fn direction(self) -> f64 {
        match self {
            Self::LeftIsA => 1.0,
            Self::RightIsA => -1.0,
        }
    }
}

impl Serialize for Polarity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Polarity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPolarity {
            Flag(bool),
            Label(String),
        }

        Ok(match RawPolarity::deserialize(deserializer)? {
            RawPolarity::Flag(flag) => Self::from_flag(flag),
            RawPolarity::Label(label) => Self::from_label(&label),
        })
    }
}

/// Forced-choice prompt mapped to exactly one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub axis_key: AxisKey,
    #[serde(default)]
    pub a_side: Polarity,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub option_a: String,
    #[serde(default)]
    pub option_b: String,
}

impl Question {
    /// Weight used during aggregation; an unset (zero) weight counts as 1.
    pub fn effective_weight(&self) -> f64 {
        if self.weight == 0.0 || self.weight.is_nan() {
            1.0
        } else {
            self.weight
        }
    }
}

pub(crate) fn default_weight() -> f64 {
    1.0
}

/// Respondent reply on the five point scale, strongly A (-2) to strongly B (+2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum AnswerValue {
    StronglyA,
    LeanA,
    Neutral,
    LeanB,
    StronglyB,
}

impl AnswerValue {
    pub fn value(self) -> i8 {
        match self {
            Self::StronglyA => -2,
            Self::LeanA => -1,
            Self::Neutral => 0,
            Self::LeanB => 1,
            Self::StronglyB => 2,
        }
    }
}

impl TryFrom<i8> for AnswerValue {
    type Error = InvalidAnswer;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -2 => Ok(Self::StronglyA),
            -1 => Ok(Self::LeanA),
            0 => Ok(Self::Neutral),
            1 => Ok(Self::LeanB),
            2 => Ok(Self::StronglyB),
            other => Err(InvalidAnswer(other)),
        }
    }
}

impl From<AnswerValue> for i8 {
    fn from(value: AnswerValue) -> Self {
        value.value()
    }
}

/// Raised when an answer falls outside the -2..=2 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("answer value {0} is outside the -2..=2 scale")]
pub struct InvalidAnswer(pub i8);

/// Answers collected during one attempt, keyed by question id.
pub type Answers = HashMap<QuestionId, AnswerValue>;
