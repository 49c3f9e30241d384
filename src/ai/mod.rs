pub mod gemini;

pub use gemini::GeminiClient;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::image::ImageInput;

/// What gets sent to the model: a text prompt or a bare image.
#[derive(Debug, Clone)]
pub enum Prompt {
    Text(String),
    Image(ImageInput),
}

/// Failure of a single model call, sorted into the buckets the chat shows.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    #[error("API key is invalid or not set: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Connectivity(String),
    #[error("no response after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiErrorKind {
    Auth,
    Connectivity,
    Timeout,
    Backend,
}

impl AiError {
    /// Sort a free-form backend message by the phrases the service uses.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("API key") {
            AiError::Auth(message)
        } else if message.to_lowercase().contains("network") {
            AiError::Connectivity(message)
        } else {
            AiError::Backend(message)
        }
    }

    pub fn kind(&self) -> AiErrorKind {
        match self {
            AiError::Auth(_) => AiErrorKind::Auth,
            AiError::Connectivity(_) => AiErrorKind::Connectivity,
            AiError::Timeout(_) => AiErrorKind::Timeout,
            AiError::Backend(_) => AiErrorKind::Backend,
        }
    }

    /// Transcript text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AiError::Auth(_) => {
                "<b>Error:</b> API key is invalid or not set. Please check your configuration."
                    .to_string()
            }
            AiError::Connectivity(_) => {
                "<b>Error:</b> Network connection error. Please check your internet connection."
                    .to_string()
            }
            AiError::Timeout(_) => {
                "<b>Error:</b> The AI service did not respond in time. Please try again."
                    .to_string()
            }
            AiError::Backend(message) => format!("<b>Error:</b> {}", message),
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            AiError::Connectivity(err.to_string())
        } else {
            AiError::classify(err.to_string())
        }
    }
}

/// The hosted model, as seen by the solver and the image extractor.
#[async_trait]
pub trait MathModel: Send + Sync {
    /// Send one prompt and return the model's text reply.
    async fn generate(&self, prompt: Prompt) -> Result<String, AiError>;
}

/// Run [`MathModel::generate`] bounded by `limit`.
pub async fn generate_with_timeout(
    model: &dyn MathModel,
    prompt: Prompt,
    limit: Duration,
) -> Result<String, AiError> {
    match tokio::time::timeout(limit, model.generate(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(AiError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl MathModel for Stalled {
        async fn generate(&self, _prompt: Prompt) -> Result<String, AiError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    #[test]
    fn test_classify_api_key_message() {
        let err = AiError::classify("400 API key not valid. Please pass a valid API key.");
        assert_eq!(err.kind(), AiErrorKind::Auth);
    }

    #[test]
    fn test_classify_network_message() {
        let err = AiError::classify("Network is unreachable");
        assert_eq!(err.kind(), AiErrorKind::Connectivity);
    }

    #[test]
    fn test_classify_other_message_keeps_text() {
        let err = AiError::classify("quota exceeded");
        assert_eq!(err.kind(), AiErrorKind::Backend);
        assert_eq!(err.user_message(), "<b>Error:</b> quota exceeded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_times_out() {
        let limit = Duration::from_secs(5);
        let result = generate_with_timeout(&Stalled, Prompt::Text("1+1".into()), limit).await;
        assert!(matches!(result, Err(AiError::Timeout(d)) if d == limit));
    }
}
