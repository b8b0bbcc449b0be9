use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::backends::{HostedBackendConfig, LocalBackendConfig};

/// Default local generation endpoint (an Ollama instance behind OpenWebUI).
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:3000/ollama";
/// Default hosted provider API root.
pub const DEFAULT_TOGETHER_ENDPOINT: &str = "https://api.together.xyz/v1";
/// Hosted model offered when TOGETHER_MODEL is not set.
pub const DEFAULT_TOGETHER_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo";

/// Application configuration loaded from environment variables.
/// The hosted streaming backend is enabled only when TOGETHER_API_KEY is set.
#[derive(Debug, Clone)]
pub struct Config {
    pub local_endpoint: String,
    pub local_token: Option<String>,
    pub together_endpoint: String,
    pub together_api_key: Option<String>,
    pub together_model: String,
    pub preview_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            local_endpoint: env_or("LOCAL_LLM_ENDPOINT", DEFAULT_LOCAL_ENDPOINT),
            local_token: optional_env("LOCAL_LLM_TOKEN"),
            together_endpoint: env_or("TOGETHER_ENDPOINT", DEFAULT_TOGETHER_ENDPOINT),
            together_api_key: optional_env("TOGETHER_API_KEY"),
            together_model: env_or("TOGETHER_MODEL", DEFAULT_TOGETHER_MODEL),
            preview_dir: PathBuf::from(env_or("PREVIEW_DIR", "previews")),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn local_backend(&self) -> LocalBackendConfig {
        LocalBackendConfig {
            endpoint: self.local_endpoint.trim_end_matches('/').to_string(),
            token: self.local_token.clone(),
        }
    }

    /// The hosted backend config, or `None` when no API key is configured.
    pub fn hosted_backend(&self) -> Option<HostedBackendConfig> {
        self.together_api_key
            .as_ref()
            .map(|key| HostedBackendConfig {
                endpoint: self.together_endpoint.trim_end_matches('/').to_string(),
                api_key: key.clone(),
                model: self.together_model.clone(),
            })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
