//! Local provider — an Ollama-style generate endpoint, typically fronted by
//! OpenWebUI. One blocking request/response exchange per prompt.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BackendError, LocalBackendConfig};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

fn with_auth(request: RequestBuilder, config: &LocalBackendConfig) -> RequestBuilder {
    match &config.token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

/// Sends one non-streaming generation request and returns the text field of
/// the response.
pub(super) async fn generate(
    http: &Client,
    config: &LocalBackendConfig,
    model: &str,
    prompt: &str,
) -> Result<String, BackendError> {
    let body = GenerateRequest {
        model,
        prompt,
        stream: false,
    };

    let request = with_auth(
        http.post(format!("{}/api/generate", config.endpoint)).json(&body),
        config,
    );

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    let parsed: GenerateResponse = serde_json::from_str(&body)
        .map_err(|e| BackendError::Malformed(format!("local generate response: {e}")))?;

    debug!("Local generation returned {} chars", parsed.response.len());
    Ok(parsed.response)
}

/// Queries the discovery endpoint for installed model names, in server order.
pub(super) async fn list_tags(
    http: &Client,
    config: &LocalBackendConfig,
) -> Result<Vec<String>, BackendError> {
    let request = with_auth(http.get(format!("{}/api/tags", config.endpoint)), config);

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(BackendError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.text().await?;
    let parsed: TagsResponse = serde_json::from_str(&body)
        .map_err(|e| BackendError::Malformed(format!("model discovery response: {e}")))?;

    Ok(parsed.models.into_iter().map(|m| m.name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_serializes_with_stream_disabled() {
        let body = GenerateRequest {
            model: "deepseek-r1:32b",
            prompt: "Write a cover letter.",
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "deepseek-r1:32b");
        assert_eq!(value["prompt"], "Write a cover letter.");
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn test_generate_response_deserializes_text_field() {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"response": "Dear Hiring Manager,"}"#).unwrap();
        assert_eq!(parsed.response, "Dear Hiring Manager,");
    }

    #[test]
    fn test_generate_response_without_text_field_fails() {
        let result: Result<GenerateResponse, _> = serde_json::from_str(r#"{"done": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_tags_response_deserializes_model_names_in_order() {
        let parsed: TagsResponse = serde_json::from_str(
            r#"{"models": [{"name": "deepseek-r1:32b", "size": 1}, {"name": "llama3.1:8b"}]}"#,
        )
        .unwrap();
        let names: Vec<String> = parsed.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, ["deepseek-r1:32b", "llama3.1:8b"]);
    }
}
