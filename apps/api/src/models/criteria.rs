use serde::Serialize;

use crate::errors::PipelineError;

/// The ordered hiring criteria extracted from one job description.
///
/// Never empty: construction fails when no non-blank criterion remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CriteriaSet(Vec<String>);

impl CriteriaSet {
    /// Trims every criterion, drops blank ones and keeps the rest in order.
    pub fn new<I, S>(criteria: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let criteria: Vec<String> = criteria
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if criteria.is_empty() {
            return Err(PipelineError::InvalidShape(
                "criteria list has no non-blank entries".to_string(),
            ));
        }
        Ok(Self(criteria))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
