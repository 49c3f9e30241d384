use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AiError, MathModel, Prompt};
use crate::config::Config;

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiBlob },
}

#[derive(Serialize)]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_key, &config.base_url, &config.model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn query(&self, prompt: Prompt) -> Result<String, AiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let part = match prompt {
            Prompt::Text(text) => GeminiPart::Text { text },
            Prompt::Image(image) => GeminiPart::InlineData {
                inline_data: GeminiBlob {
                    mime_type: image.mime_type().to_string(),
                    data: general_purpose::STANDARD.encode(image.bytes()),
                },
            },
        };
        let request = GeminiRequest {
            contents: vec![GeminiContent { parts: vec![part] }],
        };

        debug!(model = %self.model, "sending generateContent request");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        Ok(gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl MathModel for GeminiClient {
    async fn generate(&self, prompt: Prompt) -> Result<String, AiError> {
        self.query(prompt).await
    }
}

fn error_for_status(status: StatusCode, body: &str) -> AiError {
    let message = serde_json::from_str::<GeminiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiError::Auth(message),
        _ => AiError::classify(format!("Gemini API error {}: {}", status, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiErrorKind;

    #[test]
    fn test_error_for_status_invalid_key() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let err = error_for_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind(), AiErrorKind::Auth);
    }

    #[test]
    fn test_error_for_status_forbidden() {
        let err = error_for_status(StatusCode::FORBIDDEN, "denied");
        assert_eq!(err.kind(), AiErrorKind::Auth);
    }

    #[test]
    fn test_error_for_status_other() {
        let err = error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.kind(), AiErrorKind::Backend);
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_image_part_serialization() {
        let part = GeminiPart::InlineData {
            inline_data: GeminiBlob {
                mime_type: "image/png".into(),
                data: general_purpose::STANDARD.encode(b"png"),
            },
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["inline_data"]["mime_type"], "image/png");
        assert_eq!(json["inline_data"]["data"], "cG5n");
    }
}
