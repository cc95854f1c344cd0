//! Scores resumes against a `CriteriaSet`, one model call per resume.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::{info, warn};

use crate::documents::{extract_upload, DocumentKind, UploadedFile};
use crate::errors::{AppError, PipelineError};
use crate::llm_client::json_span::wide_object_span;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{CompletionBackend, CompletionRequest, GenerationParams};
use crate::models::{CandidateRecord, CriteriaSet};
use crate::ranking::prompts::{SCORING_PROMPT_TEMPLATE, SCORING_SYSTEM};

pub const SCORING_MODEL: &str = "llama-3.3-70b-versatile";

/// Name placeholder in the example output; the model fills in what it finds.
pub const PLACEHOLDER_CANDIDATE_NAME: &str = "Extracted Name";

const SCORING_PARAMS: GenerationParams = GenerationParams {
    temperature: 0.7,
    max_tokens: 1024,
    top_p: 1.0,
};

/// What a batch does when one resume cannot be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Abort the whole batch on the first failing resume.
    FailFast,
    /// Record a placeholder row for the failing resume and keep going.
    Continue,
}

impl FromStr for BatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_fast" => Ok(BatchPolicy::FailFast),
            "continue" => Ok(BatchPolicy::Continue),
            other => Err(format!("expected 'fail_fast' or 'continue', got '{other}'")),
        }
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BatchPolicy::FailFast => "fail_fast",
            BatchPolicy::Continue => "continue",
        })
    }
}

/// A resume that produced no scores under `BatchPolicy::Continue`.
#[derive(Debug)]
pub struct ResumeFailure {
    pub file: String,
    pub error: PipelineError,
}

/// Outcome of a scoring batch, records in submission order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<CandidateRecord>,
    pub scored: usize,
    pub failures: Vec<ResumeFailure>,
}

pub fn scoring_prompt(criteria: &CriteriaSet, resume_text: &str) -> String {
    let criteria_text = criteria
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n");

    fill_template(
        SCORING_PROMPT_TEMPLATE,
        &[
            ("criteria", criteria_text.as_str()),
            ("resume_text", resume_text),
            ("candidate_name", PLACEHOLDER_CANDIDATE_NAME),
            ("json_only", JSON_ONLY_INSTRUCTION),
        ],
    )
}

pub fn scoring_request(criteria: &CriteriaSet, resume_text: &str) -> CompletionRequest {
    CompletionRequest {
        model: SCORING_MODEL,
        system: SCORING_SYSTEM,
        prompt: scoring_prompt(criteria, resume_text),
        params: SCORING_PARAMS,
        json_output: true,
    }
}

/// Scores one resume. Every candidate entry in the reply becomes a record.
pub async fn score_resume(
    backend: &dyn CompletionBackend,
    criteria: &CriteriaSet,
    resume_text: &str,
) -> Result<Vec<CandidateRecord>, PipelineError> {
    let reply = backend
        .complete(&scoring_request(criteria, resume_text))
        .await?;
    parse_scoring_reply(&reply)
}

/// Parses `{"candidates": [...]}` from the first `{` to the last `}` of the reply.
pub fn parse_scoring_reply(reply: &str) -> Result<Vec<CandidateRecord>, PipelineError> {
    let span = wide_object_span(reply).ok_or(PipelineError::NoJsonFound)?;
    let parsed: Value =
        serde_json::from_str(span).map_err(|e| PipelineError::MalformedJson(e.to_string()))?;

    let candidates = match parsed.get("candidates") {
        Some(Value::Array(entries)) if !entries.is_empty() => entries,
        Some(Value::Array(_)) => {
            return Err(PipelineError::InvalidShape("'candidates' is empty".to_string()))
        }
        Some(_) => {
            return Err(PipelineError::InvalidShape("'candidates' is not a list".to_string()))
        }
        None => {
            return Err(PipelineError::InvalidShape(
                "reply has no 'candidates' key".to_string(),
            ))
        }
    };

    candidates
        .iter()
        .map(|entry| match entry {
            Value::Object(fields) => CandidateRecord::from_model_entry(fields.clone()),
            other => Err(PipelineError::InvalidShape(format!(
                "candidate entry {other} is not an object"
            ))),
        })
        .collect()
}

/// Scores every upload in submission order.
///
/// File types are checked for the whole batch before any decoding or model call.
pub async fn score_batch(
    backend: &dyn CompletionBackend,
    criteria: &CriteriaSet,
    uploads: Vec<UploadedFile>,
    policy: BatchPolicy,
) -> Result<BatchReport, AppError> {
    for upload in &uploads {
        DocumentKind::from_filename(&upload.filename)?;
    }

    let total = uploads.len();
    let mut report = BatchReport::default();

    for (index, upload) in uploads.into_iter().enumerate() {
        info!("Scoring resume {}/{}: {}", index + 1, total, upload.filename);

        let outcome = match extract_upload(&upload.filename, upload.bytes).await {
            Ok(text) => score_resume(backend, criteria, &text).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(records) => {
                report.scored += 1;
                report.records.extend(records);
            }
            Err(error) => match policy {
                BatchPolicy::FailFast => {
                    return Err(AppError::ResumeFailed {
                        file: upload.filename,
                        source: error,
                    })
                }
                BatchPolicy::Continue => {
                    warn!(
                        kind = ?error.kind(),
                        "Resume {} could not be scored: {error}",
                        upload.filename
                    );
                    report
                        .records
                        .push(CandidateRecord::failed(&upload.filename, &error.to_string()));
                    report.failures.push(ResumeFailure {
                        file: upload.filename,
                        error,
                    });
                }
            },
        }
    }

    info!(
        "Batch finished: {} scored, {} failed",
        report.scored,
        report.failures.len()
    );
    Ok(report)
}
