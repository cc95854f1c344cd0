use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::documents::{extract_upload, UploadedFile};
use crate::errors::AppError;
use crate::ranking::aggregate::RankedTable;
use crate::ranking::criteria::extract_criteria;
use crate::ranking::scoring::{score_batch, BatchReport};
use crate::session::{CriteriaSnapshot, DEFAULT_SESSION};
use crate::state::AppState;

/// Multipart field carrying the job description.
pub const JOB_DESCRIPTION_FIELD: &str = "file";
/// Multipart field carrying resumes; repeat it once per file.
pub const RESUMES_FIELD: &str = "resumes";
pub const SCORES_FILENAME: &str = "resumes_scores.csv";

const SCORED_COUNT: HeaderName = HeaderName::from_static("x-scored-count");
const FAILED_COUNT: HeaderName = HeaderName::from_static("x-failed-count");

/// POST /api/v1/criteria
pub async fn handle_create_criteria(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CriteriaSnapshot>, AppError> {
    let snapshot = extract_into_session(&state, Uuid::new_v4(), multipart).await?;
    Ok(Json(snapshot))
}

/// PUT /api/v1/sessions/:id/criteria
pub async fn handle_replace_criteria(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<CriteriaSnapshot>, AppError> {
    let snapshot = extract_into_session(&state, session_id, multipart).await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/sessions/:id/criteria
pub async fn handle_get_criteria(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CriteriaSnapshot>, AppError> {
    Ok(Json(state.sessions.criteria(session_id).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(session_id).await {
        return Err(AppError::NotFound(format!("Session {session_id} not found")));
    }
    info!("Session {session_id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/scores
pub async fn handle_score_resumes(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    score_for_session(&state, session_id, multipart).await
}

/// POST /extract_criteria/
pub async fn handle_legacy_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let snapshot = extract_into_session(&state, DEFAULT_SESSION, multipart).await?;
    Ok(Json(json!({ "criteria": snapshot.criteria.as_slice() })))
}

/// POST /score_resumes/
pub async fn handle_legacy_score(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    score_for_session(&state, DEFAULT_SESSION, multipart).await
}

/// Extracts criteria from the uploaded job description and stores them on the session.
async fn extract_into_session(
    state: &AppState,
    session_id: Uuid,
    mut multipart: Multipart,
) -> Result<CriteriaSnapshot, AppError> {
    let mut files = read_files(&mut multipart, JOB_DESCRIPTION_FIELD).await?;
    let job_description = match files.len() {
        1 => files.remove(0),
        0 => {
            return Err(AppError::Validation(format!(
                "Upload the job description in the '{JOB_DESCRIPTION_FIELD}' field"
            )))
        }
        n => {
            return Err(AppError::Validation(format!(
                "Expected one job description, got {n}"
            )))
        }
    };

    info!(
        "Session {session_id}: extracting criteria from {}",
        job_description.filename
    );
    let text = extract_upload(&job_description.filename, job_description.bytes).await?;
    let criteria = extract_criteria(state.llm.as_ref(), &text).await?;
    Ok(state.sessions.replace_criteria(session_id, criteria).await)
}

/// Scores the uploaded resumes against the session's current criteria.
///
/// The criteria are checked before the body is read, so a session without
/// criteria never reaches the decoder or the model.
async fn score_for_session(
    state: &AppState,
    session_id: Uuid,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let snapshot = state.sessions.criteria(session_id).await?;

    let uploads = read_files(&mut multipart, RESUMES_FIELD).await?;
    if uploads.is_empty() {
        return Err(AppError::Validation(format!(
            "Upload at least one resume in the '{RESUMES_FIELD}' field"
        )));
    }

    info!(
        "Session {session_id}: scoring {} resumes against criteria revision {}",
        uploads.len(),
        snapshot.revision
    );
    let report = score_batch(
        state.llm.as_ref(),
        &snapshot.criteria,
        uploads,
        state.config.batch_policy,
    )
    .await?;

    csv_response(report)
}

fn csv_response(report: BatchReport) -> Result<Response, AppError> {
    let scored = report.scored;
    let failed = report.failures.len();
    if failed > 0 {
        let files: Vec<String> = report
            .failures
            .iter()
            .map(|f| format!("{} ({:?})", f.file, f.error.kind()))
            .collect();
        warn!("{failed} resumes were not scored: {}", files.join(", "));
    }

    let table = RankedTable::from_records(report.records)?;
    if let Some(top) = table.rows().first() {
        info!("Top candidate: {}", top.name());
    }
    debug!("Score columns: {}", table.columns().join(", "));
    let body = table.to_csv()?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={SCORES_FILENAME}"),
            ),
            (SCORED_COUNT, scored.to_string()),
            (FAILED_COUNT, failed.to_string()),
        ],
        body,
    )
        .into_response())
}

/// Collects every file sent under `field_name`, in submission order.
/// Other fields are skipped.
async fn read_files(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read {filename}: {e}")))?;
        files.push(UploadedFile { filename, bytes });
    }

    Ok(files)
}
