use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::PipelineError;

pub const CANDIDATE_NAME: &str = "candidate_name";
pub const TOTAL_SCORE: &str = "total_score";
/// Column carried only by placeholder rows for resumes that could not be scored.
pub const SCORING_ERROR: &str = "scoring_error";

/// One candidate's scoring result as produced by the model.
///
/// Field names beyond `candidate_name` and `total_score` are chosen by the model
/// at runtime, so the record is an ordered map rather than a struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidateRecord {
    fields: Map<String, Value>,
}

impl CandidateRecord {
    /// Builds a record from one entry of the model's `candidates` array.
    ///
    /// Values are kept verbatim; `candidate_name` is moved to the front and the
    /// other fields keep the model's order. `total_score` must be present and numeric.
    pub fn from_model_entry(mut entry: Map<String, Value>) -> Result<Self, PipelineError> {
        let name = entry
            .shift_remove(CANDIDATE_NAME)
            .ok_or(PipelineError::MissingField(CANDIDATE_NAME))?;

        let mut fields = Map::with_capacity(entry.len() + 1);
        fields.insert(CANDIDATE_NAME.to_string(), name);
        fields.extend(entry);

        let record = Self { fields };
        if record.get(TOTAL_SCORE).is_none() {
            return Err(PipelineError::MissingField(TOTAL_SCORE));
        }
        record.total_score()?;
        Ok(record)
    }

    /// Placeholder row for a resume whose scoring failed.
    pub fn failed(file: &str, error: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(CANDIDATE_NAME.to_string(), Value::String(file.to_string()));
        fields.insert(SCORING_ERROR.to_string(), Value::String(error.to_string()));
        Self { fields }
    }

    /// Wraps fields without validation, for exercising consumers with bad records.
    #[cfg(test)]
    pub(crate) fn from_fields_unchecked(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Display form of the candidate name, for logs and error messages.
    pub fn name(&self) -> String {
        match self.get(CANDIDATE_NAME) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// The numeric total score; `None` when the record has no score.
    pub fn total_score(&self) -> Result<Option<f64>, PipelineError> {
        match self.get(TOTAL_SCORE) {
            None => Ok(None),
            Some(value) => numeric_value(value).map(Some).ok_or_else(|| {
                PipelineError::InvalidScore {
                    candidate: self.name(),
                    value: match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                }
            }),
        }
    }
}

/// Coerces a JSON number or numeric string to a finite `f64`.
fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}
