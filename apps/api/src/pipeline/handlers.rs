//! Axum route handlers for the cover-letter API.

use std::io::Write;

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::backends::BackendId;
use crate::errors::AppError;
use crate::pipeline::composer::generate_letter;
use crate::pipeline::preprocess::PreprocessOptions;
use crate::render::render_preview;
use crate::state::AppState;

/// Local model preselected when the caller omits the backend field.
const DEFAULT_BACKEND_ID: &str = "deepseek-r1:32b";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LetterResponse {
    pub letter: String,
    pub history: Vec<String>,
    pub cursor: i64,
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    /// Text currently shown by the caller; echoed back when there is
    /// nothing to move to.
    #[serde(default)]
    pub current: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub letter_text: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    /// Path of the rendered PNG, or null when no preview is available.
    pub image_path: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/letters/generate
///
/// Multipart form: `cv` (file), `job_description`, optional `backend`,
/// `preprocess`, `preprocess_cv`, `preprocess_job`. Missing CV or empty job
/// description is a validation error; pipeline failures come back as the
/// sentinel letter text with history untouched.
pub async fn handle_generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<LetterResponse>, AppError> {
    let mut cv_file: Option<(String, Bytes)> = None;
    let mut job_description = String::new();
    let mut backend_field: Option<String> = None;
    let mut preprocess = false;
    let mut preprocess_cv: Option<bool> = None;
    let mut preprocess_job: Option<bool> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cv" => {
                let file_name = field.file_name().unwrap_or("cv.pdf").to_string();
                cv_file = Some((file_name, field.bytes().await?));
            }
            "job_description" => job_description = field.text().await?,
            "backend" => backend_field = Some(field.text().await?),
            "preprocess" => preprocess = parse_bool_field(&field.text().await?),
            "preprocess_cv" => preprocess_cv = Some(parse_bool_field(&field.text().await?)),
            "preprocess_job" => preprocess_job = Some(parse_bool_field(&field.text().await?)),
            other => warn!("Ignoring unknown multipart field '{other}'"),
        }
    }

    let (file_name, cv_bytes) =
        cv_file.ok_or_else(|| AppError::Validation("upload a CV first".to_string()))?;
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let id = BackendId::parse(backend_field.as_deref().unwrap_or(DEFAULT_BACKEND_ID));
    let mut options = PreprocessOptions::from_flag(preprocess);
    if let Some(cv) = preprocess_cv {
        options.cv = cv;
    }
    if let Some(job) = preprocess_job {
        options.job = job;
    }

    let cv_upload = spool_upload(&file_name, &cv_bytes)?;

    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let letter = generate_letter(
        state.backend.as_ref(),
        &mut session.composer,
        &mut session.history,
        cv_upload.path(),
        &job_description,
        &id,
        options,
    )
    .await;

    Ok(Json(LetterResponse {
        letter,
        history: session.history.entries().to_vec(),
        cursor: session.history.cursor_index(),
    }))
}

/// POST /api/v1/letters/undo
///
/// Steps the session cursor back one letter. A no-op at the oldest entry;
/// with an empty history the caller's current text is echoed back.
pub async fn handle_undo(
    State(state): State<AppState>,
    Json(request): Json<StepRequest>,
) -> Json<LetterResponse> {
    let mut session = state.session.lock().await;
    let letter = session
        .history
        .undo()
        .map(str::to_string)
        .or(request.current)
        .unwrap_or_default();
    Json(LetterResponse {
        letter,
        history: session.history.entries().to_vec(),
        cursor: session.history.cursor_index(),
    })
}

/// POST /api/v1/letters/redo
///
/// Steps the session cursor forward one letter. A no-op at the newest entry.
pub async fn handle_redo(
    State(state): State<AppState>,
    Json(request): Json<StepRequest>,
) -> Json<LetterResponse> {
    let mut session = state.session.lock().await;
    let letter = session
        .history
        .redo()
        .map(str::to_string)
        .or(request.current)
        .unwrap_or_default();
    Json(LetterResponse {
        letter,
        history: session.history.entries().to_vec(),
        cursor: session.history.cursor_index(),
    })
}

/// GET /api/v1/models
///
/// Ordered backend identifiers for the model picker. Never fails; discovery
/// errors are absorbed into a fallback list.
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.backend.list_model_ids().await,
    })
}

/// POST /api/v1/letters/preview
///
/// Renders the letter through the typesetting toolchain. A null image path
/// means "no preview available"; the letter itself is unaffected.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    if request.letter_text.trim().is_empty() {
        return Err(AppError::Validation(
            "letter_text cannot be empty".to_string(),
        ));
    }

    let image_path = render_preview(&state.config.preview_dir, &request.letter_text).await;
    Ok(Json(PreviewResponse {
        image_path: image_path.map(|p| p.display().to_string()),
    }))
}

/// POST /api/v1/letters/transcript/reset
///
/// Clears the composer's conversational transcript. Revision history is
/// unaffected.
pub async fn handle_reset_transcript(State(state): State<AppState>) -> Json<Value> {
    let mut session = state.session.lock().await;
    session.composer.reset();
    Json(json!({ "status": "reset" }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Spools an uploaded CV to a temp file, preserving the extension so
/// extraction can dispatch on it. The file is removed when the guard drops.
fn spool_upload(file_name: &str, bytes: &[u8]) -> Result<tempfile::NamedTempFile, AppError> {
    let suffix = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("cv-upload-")
        .suffix(&suffix)
        .tempfile()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to spool upload: {e}")))?;
    file.write_all(bytes)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to spool upload: {e}")))?;
    Ok(file)
}

fn parse_bool_field(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_field_accepts_form_spellings() {
        for raw in ["true", "TRUE", "1", "Yes", "on"] {
            assert!(parse_bool_field(raw), "{raw} should parse as true");
        }
        for raw in ["false", "0", "No", "off", ""] {
            assert!(!parse_bool_field(raw), "{raw} should parse as false");
        }
    }

    #[test]
    fn test_spool_upload_preserves_extension() {
        let file = spool_upload("resume.pdf", b"%PDF-1.4").unwrap();
        assert_eq!(
            file.path().extension().and_then(|e| e.to_str()),
            Some("pdf")
        );
        assert_eq!(std::fs::read(file.path()).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_spool_upload_without_extension_still_spools() {
        let file = spool_upload("resume", b"plain").unwrap();
        assert!(file.path().extension().is_none());
    }
}
