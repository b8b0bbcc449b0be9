//! Model Backend Adapter — the single point of entry for all text-generation
//! calls in Covercraft.
//!
//! ARCHITECTURAL RULE: no other module may talk to a provider endpoint
//! directly. All model interactions MUST go through `ModelBackend`.
//!
//! Two provider variants exist: a local Ollama-style endpoint (blocking
//! request/response) and a hosted Together-style endpoint (streaming chat).
//! Backend identifiers route between them via the `together:` prefix.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

pub mod hosted;
pub mod local;

/// Identifier prefix that routes a backend id to the hosted streaming
/// provider. The remainder of the id names the concrete hosted model.
pub const HOSTED_PREFIX: &str = "together:";

/// Returned when model discovery fails; keeps the model picker usable even
/// when the local endpoint is down.
pub const FALLBACK_MODEL_IDS: &[&str] = &["deepseek-r1:32b", "llama3.1:8b", "mistral:7b"];

/// Bounded transport timeout for every provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed response body: {0}")]
    Malformed(String),

    #[error("hosted backend '{0}' requested but no hosted provider is configured")]
    HostedNotConfigured(String),
}

/// Routing decision for a backend identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendId {
    /// A model served by the local generation endpoint.
    Local(String),
    /// A model served by the hosted streaming provider (`together:` prefix).
    Hosted(String),
}

impl BackendId {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().strip_prefix(HOSTED_PREFIX) {
            Some(model) => BackendId::Hosted(model.trim().to_string()),
            None => BackendId::Local(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendId::Local(model) => write!(f, "{model}"),
            BackendId::Hosted(model) => write!(f, "{HOSTED_PREFIX}{model}"),
        }
    }
}

/// Connection details for the local generation endpoint.
#[derive(Debug, Clone)]
pub struct LocalBackendConfig {
    pub endpoint: String,
    pub token: Option<String>,
}

/// Connection details for the hosted streaming provider.
#[derive(Debug, Clone)]
pub struct HostedBackendConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Model advertised in the backend list; queries use the model named in
    /// the backend id itself.
    pub model: String,
}

/// Uniform interface over the heterogeneous providers. `AppState` carries an
/// `Arc<dyn ModelBackend>` so tests can substitute a scripted backend.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Sends a sanitized prompt to the selected backend and returns the
    /// generated text. Performs no retries; callers decide whether to
    /// retry or report.
    async fn query(&self, prompt: &str, backend: &BackendId) -> Result<String, BackendError>;

    /// Lists selectable backend identifiers in order. Never fails: discovery
    /// errors degrade to `FALLBACK_MODEL_IDS`, and the hosted model (when
    /// configured) is always appended with its prefix.
    async fn list_model_ids(&self) -> Vec<String>;
}

/// Production `ModelBackend` backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpModelClient {
    http: Client,
    local: LocalBackendConfig,
    hosted: Option<HostedBackendConfig>,
}

impl HttpModelClient {
    pub fn new(local: LocalBackendConfig, hosted: Option<HostedBackendConfig>) -> Self {
        Self {
            http: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            local,
            hosted,
        }
    }
}

#[async_trait]
impl ModelBackend for HttpModelClient {
    async fn query(&self, prompt: &str, backend: &BackendId) -> Result<String, BackendError> {
        match backend {
            BackendId::Local(model) => local::generate(&self.http, &self.local, model, prompt).await,
            BackendId::Hosted(model) => {
                let Some(hosted) = &self.hosted else {
                    return Err(BackendError::HostedNotConfigured(model.clone()));
                };
                hosted::generate_streaming(&self.http, hosted, model, prompt).await
            }
        }
    }

    async fn list_model_ids(&self) -> Vec<String> {
        let discovered = match local::list_tags(&self.http, &self.local).await {
            Ok(models) => models,
            Err(e) => {
                // Distinct from "no hosted backend configured"; that case
                // simply appends nothing below.
                warn!("Model discovery failed, serving fallback list: {e}");
                FALLBACK_MODEL_IDS.iter().map(|m| (*m).to_string()).collect()
            }
        };
        with_hosted_id(discovered, self.hosted.as_ref())
    }
}

/// Appends the hosted model id (with its prefix) to a discovered or fallback
/// list, independent of how the list was obtained.
fn with_hosted_id(mut ids: Vec<String>, hosted: Option<&HostedBackendConfig>) -> Vec<String> {
    if let Some(hosted) = hosted {
        ids.push(format!("{HOSTED_PREFIX}{}", hosted.model));
    }
    ids
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{BackendError, BackendId, ModelBackend};

    /// Test backend that records every prompt and replays a scripted
    /// sequence of results.
    pub struct ScriptedBackend {
        pub prompts: Mutex<Vec<String>>,
        script: Mutex<VecDeque<Result<String, BackendError>>>,
        pub models: Vec<String>,
    }

    impl ScriptedBackend {
        pub fn replying<I: IntoIterator<Item = &'static str>>(replies: I) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                script: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
                models: vec!["deepseek-r1:32b".to_string()],
            }
        }

        pub fn failing() -> Self {
            let err = BackendError::Api {
                status: 503,
                message: "backend down".to_string(),
            };
            Self {
                prompts: Mutex::new(Vec::new()),
                script: Mutex::new(VecDeque::from([Err(err)])),
                models: Vec::new(),
            }
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompt(&self, index: usize) -> String {
            self.prompts.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        async fn query(&self, prompt: &str, _backend: &BackendId) -> Result<String, BackendError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }

        async fn list_model_ids(&self) -> Vec<String> {
            self.models.clone()
        }
    }
}
