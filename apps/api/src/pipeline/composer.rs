//! Cover Letter Composer — orchestrates the generation pipeline.
//!
//! Flow: extract CV text → optional preprocessing → fill template →
//! sanitize → one backend call → commit to transcript and revision history.
//!
//! Every failure inside a generate call degrades to the fixed sentinel
//! text; no structured error and no partial letter ever reaches the caller.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::backends::{BackendError, BackendId, ModelBackend};
use crate::extract::{extract_document_text, ExtractError};
use crate::history::RevisionHistory;
use crate::pipeline::preprocess::{summarize_cv, summarize_job, PreprocessOptions};
use crate::pipeline::prompts::COVER_LETTER_PROMPT_TEMPLATE;
use crate::sanitize::sanitize;

/// Returned to the caller whenever a generate call fails anywhere inside the
/// pipeline.
pub const GENERATION_FAILURE_MESSAGE: &str = "Unable to generate a cover letter at this time.";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("document extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("backend call failed: {0}")]
    Backend(#[from] BackendError),
}

/// Speaker of one transcript turn, matching the hosted chat wire roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prompt or letter retained as conversational context.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptTurn {
    pub role: Role,
    pub content: String,
}

/// Builds cover-letter prompts and owns the session transcript.
///
/// The transcript is context for a caller who wishes to extend the
/// interaction; it is not the revision history and resets independently.
#[derive(Debug, Default)]
pub struct Composer {
    transcript: Vec<TranscriptTurn>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the composition pipeline over already-extracted CV text: optional
    /// preprocessing, template fill, sanitation, one backend call. On success
    /// the prompt and the letter are appended to the transcript, in that
    /// order; on failure the transcript is untouched.
    pub async fn compose(
        &mut self,
        backend: &dyn ModelBackend,
        cv_text: &str,
        job_description: &str,
        id: &BackendId,
        preprocess: PreprocessOptions,
    ) -> Result<String, ComposeError> {
        let cv = if preprocess.cv {
            summarize_cv(backend, cv_text, id).await?
        } else {
            cv_text.to_string()
        };
        let job = if preprocess.job {
            summarize_job(backend, job_description, id).await?
        } else {
            job_description.to_string()
        };

        let prompt = sanitize(
            &COVER_LETTER_PROMPT_TEMPLATE
                .replace("{cv_text}", &cv)
                .replace("{job_description}", &job),
        );

        let letter = backend.query(&prompt, id).await?;

        self.transcript.push(TranscriptTurn {
            role: Role::User,
            content: prompt,
        });
        self.transcript.push(TranscriptTurn {
            role: Role::Assistant,
            content: letter.clone(),
        });

        Ok(letter)
    }

    pub fn transcript(&self) -> &[TranscriptTurn] {
        &self.transcript
    }

    /// Clears the conversational context for a fresh session.
    pub fn reset(&mut self) {
        self.transcript.clear();
    }
}

/// Top of the generate operation: extracts the CV, composes a letter, and
/// commits it to the revision history. Every failure degrades to the
/// sentinel text, leaving history and transcript unmodified.
pub async fn generate_letter(
    backend: &dyn ModelBackend,
    composer: &mut Composer,
    history: &mut RevisionHistory,
    cv_path: &Path,
    job_description: &str,
    id: &BackendId,
    preprocess: PreprocessOptions,
) -> String {
    let outcome = async {
        let cv_text = extract_cv_text(cv_path).await?;
        composer
            .compose(backend, &cv_text, job_description, id, preprocess)
            .await
    }
    .await;

    match outcome {
        Ok(letter) => {
            history.append(letter.clone());
            info!("Generated cover letter via {id} ({} chars)", letter.len());
            letter
        }
        Err(e) => {
            warn!("Cover letter generation failed: {e}");
            GENERATION_FAILURE_MESSAGE.to_string()
        }
    }
}

async fn extract_cv_text(path: &Path) -> Result<String, ComposeError> {
    let path = path.to_path_buf();
    let text = tokio::task::spawn_blocking(move || extract_document_text(&path))
        .await
        .map_err(|e| ComposeError::Extraction(ExtractError::Io(std::io::Error::other(e))))??;
    Ok(text)
}
