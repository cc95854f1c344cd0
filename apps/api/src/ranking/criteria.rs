//! Turns job-description text into a `CriteriaSet`.

use serde_json::Value;
use tracing::info;

use crate::errors::PipelineError;
use crate::llm_client::json_span::narrow_object_span;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{CompletionBackend, CompletionRequest, GenerationParams};
use crate::models::CriteriaSet;
use crate::ranking::prompts::{CRITERIA_PROMPT_TEMPLATE, CRITERIA_SYSTEM};

pub const CRITERIA_MODEL: &str = "llama3-70b-8192";

/// Low temperature: the model should copy criteria, not rewrite them.
const CRITERIA_PARAMS: GenerationParams = GenerationParams {
    temperature: 0.3,
    max_tokens: 512,
    top_p: 1.0,
};

pub fn criteria_prompt(jd_text: &str) -> String {
    fill_template(
        CRITERIA_PROMPT_TEMPLATE,
        &[("jd_text", jd_text), ("json_only", JSON_ONLY_INSTRUCTION)],
    )
}

pub fn criteria_request(jd_text: &str) -> CompletionRequest {
    CompletionRequest {
        model: CRITERIA_MODEL,
        system: CRITERIA_SYSTEM,
        prompt: criteria_prompt(jd_text),
        params: CRITERIA_PARAMS,
        json_output: true,
    }
}

/// Asks the model for the hiring criteria of a job description.
pub async fn extract_criteria(
    backend: &dyn CompletionBackend,
    jd_text: &str,
) -> Result<CriteriaSet, PipelineError> {
    let reply = backend.complete(&criteria_request(jd_text)).await?;
    let criteria = parse_criteria_reply(&reply)?;
    info!("Extracted {} criteria from job description", criteria.len());
    Ok(criteria)
}

/// Parses `{"criteria": [...]}` out of a reply that may carry fences or prose.
///
/// Only the span from the first `{` to the first `}` after it is parsed.
pub fn parse_criteria_reply(reply: &str) -> Result<CriteriaSet, PipelineError> {
    let span = narrow_object_span(reply).ok_or(PipelineError::NoJsonFound)?;
    let parsed: Value =
        serde_json::from_str(span).map_err(|e| PipelineError::MalformedJson(e.to_string()))?;

    let criteria = parsed
        .get("criteria")
        .ok_or(PipelineError::MissingField("criteria"))?
        .as_array()
        .ok_or_else(|| PipelineError::InvalidShape("'criteria' is not a list".to_string()))?;

    let items = criteria
        .iter()
        .map(|c| {
            c.as_str().ok_or_else(|| {
                PipelineError::InvalidShape(format!("criterion {c} is not a string"))
            })
        })
        .collect::<Result<Vec<&str>, _>>()?;

    CriteriaSet::new(items)
}
