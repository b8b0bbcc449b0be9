//! Optional LLM preprocessing — summarizes the CV and the job description
//! before composition so long inputs fit a single generation prompt.

use crate::backends::{BackendError, BackendId, ModelBackend};
use crate::pipeline::prompts::{CV_SUMMARY_PROMPT_TEMPLATE, JOB_SUMMARY_PROMPT_TEMPLATE};
use crate::sanitize::sanitize;

/// Which inputs get a summarization pass before composition. The request
/// surface drives both from one flag; per-input overrides are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessOptions {
    pub cv: bool,
    pub job: bool,
}

impl PreprocessOptions {
    /// Both inputs follow the single caller-facing flag.
    pub fn from_flag(preprocess: bool) -> Self {
        Self {
            cv: preprocess,
            job: preprocess,
        }
    }
}

/// Summarizes raw CV text through the selected backend. Returns the model
/// output verbatim.
pub async fn summarize_cv(
    backend: &dyn ModelBackend,
    cv_text: &str,
    id: &BackendId,
) -> Result<String, BackendError> {
    let prompt = sanitize(&CV_SUMMARY_PROMPT_TEMPLATE.replace("{cv_text}", cv_text));
    backend.query(&prompt, id).await
}

/// Summarizes a raw job description through the selected backend. Returns
/// the model output verbatim.
pub async fn summarize_job(
    backend: &dyn ModelBackend,
    job_description: &str,
    id: &BackendId,
) -> Result<String, BackendError> {
    let prompt =
        sanitize(&JOB_SUMMARY_PROMPT_TEMPLATE.replace("{job_description}", job_description));
    backend.query(&prompt, id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::testing::ScriptedBackend;

    #[tokio::test]
    async fn test_summarize_cv_sends_sanitized_summary_prompt() {
        let backend = ScriptedBackend::replying(["a short profile"]);
        let id = BackendId::parse("deepseek-r1:32b");

        let summary = summarize_cv(&backend, "ten years <of> Rust", &id).await.unwrap();

        assert_eq!(summary, "a short profile");
        assert_eq!(backend.call_count(), 1);
        let prompt = backend.prompt(0);
        assert!(prompt.contains("Summarise the following CV"));
        assert!(prompt.contains("ten years of Rust"));
        assert!(!prompt.contains('<'));
        assert!(!prompt.contains("{cv_text}"));
    }

    #[tokio::test]
    async fn test_summarize_job_embeds_job_description() {
        let backend = ScriptedBackend::replying(["core duties"]);
        let id = BackendId::parse("deepseek-r1:32b");

        let summary = summarize_job(&backend, "maintain billing systems", &id)
            .await
            .unwrap();

        assert_eq!(summary, "core duties");
        let prompt = backend.prompt(0);
        assert!(prompt.contains("maintain billing systems"));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_from_flag_drives_both_inputs() {
        assert_eq!(
            PreprocessOptions::from_flag(true),
            PreprocessOptions { cv: true, job: true }
        );
        assert_eq!(
            PreprocessOptions::from_flag(false),
            PreprocessOptions { cv: false, job: false }
        );
    }
}
