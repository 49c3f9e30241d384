use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "MATHSOLVER_MODEL";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_EXPORT_PATH: &str = "chat_history.pdf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not found. Please set GEMINI_API_KEY in your environment.")]
    MissingApiKey,
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Optional, non-secret settings stored in `~/.config/mathsolver/config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Settings {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub typing_delay_ms: Option<u64>,
    pub export_path: Option<PathBuf>,
}

impl Settings {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mathsolver").join("config.json"))
    }
}

/// Everything the solver needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
    /// Artificial pause before the model call so the "Thinking..." line shows.
    pub typing_delay: Option<Duration>,
    pub export_path: PathBuf,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            typing_delay: None,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }

    /// Load from the process environment and the default settings file.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = match Settings::default_path() {
            Some(path) => Settings::load_from(&path)?,
            None => Settings::default(),
        };
        Self::resolve(
            std::env::var(API_KEY_VAR).ok(),
            std::env::var(MODEL_VAR).ok(),
            settings,
        )
    }

    /// Combine the raw environment values with file settings.
    pub fn resolve(
        api_key: Option<String>,
        model_override: Option<String>,
        settings: Settings,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);

        if let Some(model) = model_override
            .filter(|m| !m.trim().is_empty())
            .or(settings.model)
        {
            config.model = model;
        }
        if let Some(base_url) = settings.base_url {
            config.base_url = base_url;
        }
        if let Some(secs) = settings.request_timeout_secs {
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        config.typing_delay = settings
            .typing_delay_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);
        if let Some(path) = settings.export_path {
            config.export_path = path;
        }

        Ok(config)
    }
}
