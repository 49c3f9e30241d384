use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::ai::{self, AiError, MathModel, Prompt};
use crate::image::ImageInput;

/// Result of reading a problem out of an image.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// First line of the model's reply that contains a digit.
    Text(String),
    /// The model answered, but nothing in the reply looks like a problem.
    Miss,
    Failed(AiError),
}

/// Sends images to the model and pulls out the problem statement.
#[derive(Clone)]
pub struct ImageExtractor {
    model: Arc<dyn MathModel>,
    timeout: Duration,
}

impl ImageExtractor {
    pub fn new(model: Arc<dyn MathModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// The image goes out with no accompanying prompt text.
    pub async fn extract(&self, image: &ImageInput) -> Extraction {
        debug!(?image, "extracting problem from image");
        match ai::generate_with_timeout(self.model.as_ref(), Prompt::Image(image.clone()), self.timeout)
            .await
        {
            Ok(reply) => match first_numeric_line(&reply) {
                Some(line) => Extraction::Text(line),
                None => {
                    debug!(reply_len = reply.len(), "no digit-bearing line in image reply");
                    Extraction::Miss
                }
            },
            Err(e) => {
                warn!(error = %e, "image extraction failed");
                Extraction::Failed(e)
            }
        }
    }
}

// "Step 2:", "Problem 1 -", "3." or "4)" at the start of a line.
static ENUMERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:step|line|problem|question|example)\s*\d+\s*[:.)-]|\d+\s*[.)])")
        .unwrap()
});

/// First line with a digit in its content, trimmed.
///
/// Numbering labels at the start of a line do not count, so a verbose
/// "Step 1: read the image" preamble is skipped. The returned line keeps
/// its label.
pub fn first_numeric_line(text: &str) -> Option<String> {
    text.trim()
        .lines()
        .find(|line| {
            ENUMERATOR
                .replace(line, "")
                .chars()
                .any(|c| c.is_ascii_digit())
        })
        .map(|line| line.trim().to_string())
}
