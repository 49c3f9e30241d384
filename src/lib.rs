pub mod ai;
pub mod config;
pub mod export;
pub mod extractor;
pub mod image;
pub mod markup;
pub mod orchestrator;
pub mod quick_reply;
pub mod transcript;

// Re-export main types for convenience
pub use ai::{AiError, AiErrorKind, GeminiClient, MathModel, Prompt};
pub use config::{Config, ConfigError};
pub use export::{export_pdf, ExportError, ExportSummary};
pub use extractor::{Extraction, ImageExtractor};
pub use image::{ImageError, ImageInput};
pub use orchestrator::{Orchestrator, RawInput, RequestState, SubmitOutcome};
pub use transcript::{Sender, Transcript, TranscriptEntry};
