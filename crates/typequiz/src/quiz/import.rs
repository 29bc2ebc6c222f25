use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::scoring::{AxisKey, Polarity, Question, QuestionId};

/// Failure while reading a question spreadsheet export.
#[derive(Debug, thiserror::Error)]
pub enum QuestionImportError {
    #[error("failed to read question export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid question CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognised a_side value '{value}'")]
    InvalidPolarity { row: usize, value: String },
    #[error("row {row}: weight must be a positive number, got '{value}'")]
    InvalidWeight { row: usize, value: String },
}

/// Bulk question import from CSV with the header
/// `id,axis_key,a_side,weight,text,option_a,option_b`.
pub struct QuestionCsvImporter;

impl QuestionCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, QuestionImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Question>, QuestionImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut questions = Vec::new();

        for (index, record) in csv_reader.deserialize::<QuestionRow>().enumerate() {
            let row = record?;
            // header is line 1
            let line = index + 2;
            questions.push(row.into_question(line)?);
        }

        Ok(questions)
    }
}

#[derive(Debug, Deserialize)]
struct QuestionRow {
    id: String,
    axis_key: String,
    a_side: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    weight: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    option_a: String,
    #[serde(default)]
    option_b: String,
}

impl QuestionRow {
    fn into_question(self, row: usize) -> Result<Question, QuestionImportError> {
        let a_side = parse_polarity(&self.a_side).ok_or_else(|| {
            QuestionImportError::InvalidPolarity {
                row,
                value: self.a_side.clone(),
            }
        })?;

        let weight = match self.weight.as_deref() {
            None => 1.0,
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|weight| weight.is_finite() && *weight > 0.0)
                .ok_or_else(|| QuestionImportError::InvalidWeight {
                    row,
                    value: raw.to_string(),
                })?,
        };

        Ok(Question {
            id: QuestionId(self.id),
            axis_key: AxisKey(self.axis_key),
            a_side,
            weight,
            text: self.text,
            option_a: self.option_a,
            option_b: self.option_b,
        })
    }
}

fn parse_polarity(raw: &str) -> Option<Polarity> {
    match raw.to_ascii_uppercase().as_str() {
        "LEFT" | "TRUE" => Some(Polarity::LeftIsA),
        "RIGHT" | "FALSE" => Some(Polarity::RightIsA),
        _ => None,
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
