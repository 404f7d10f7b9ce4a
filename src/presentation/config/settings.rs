use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::DocumentType;

use super::Environment;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub processing: ProcessingSettings,
    pub chunking: ChunkingSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_mb: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Groq,
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "groq",
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAi => "openai",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "llama-3.1-8b-instant",
            LlmProvider::Ollama => "mistral:latest",
            LlmProvider::OpenAi => "gpt-4o-mini",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Groq => "https://api.groq.com/openai/v1",
            LlmProvider::Ollama => "http://localhost:11434",
            LlmProvider::OpenAi => "https://api.openai.com/v1",
        }
    }

    fn requires_api_key(&self) -> bool {
        !matches!(self, LlmProvider::Ollama)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Groq,
            api_key: String::new(),
            model: None,
            base_url: None,
            temperature: 0.1,
            max_tokens: 2048,
            timeout_secs: 120,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

impl LlmSettings {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Chat-completions base URL. Ollama serves its OpenAI-compatible API
    /// under `/v1`.
    pub fn base_url(&self) -> String {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/');
        match self.provider {
            LlmProvider::Ollama if !base.ends_with("/v1") => format!("{base}/v1"),
            _ => base.to_string(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    pub worker_count: usize,
    pub classification_sample_chars: usize,
    pub queue_capacity: usize,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            worker_count: 6,
            classification_sample_chars: 2000,
            queue_capacity: 100,
        }
    }
}

/// Chunk size windows per document type, in characters, plus the overlap
/// shared by all of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub overlap: usize,
    pub iso: ChunkSizes,
    pub dpdp: ChunkSizes,
    pub rbi: ChunkSizes,
    pub general: ChunkSizes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ChunkSizes {
    pub min: usize,
    pub max: usize,
}

impl ChunkSizes {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            overlap: 200,
            iso: ChunkSizes::new(2000, 2500),
            dpdp: ChunkSizes::new(1600, 2000),
            rbi: ChunkSizes::new(1800, 2200),
            general: ChunkSizes::new(1600, 2000),
        }
    }
}

impl ChunkingSettings {
    pub fn sizes_for(&self, document_type: DocumentType) -> ChunkSizes {
        match document_type {
            DocumentType::Iso => self.iso,
            DocumentType::Dpdp => self.dpdp,
            DocumentType::Rbi => self.rbi,
            DocumentType::General => self.general,
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let windows = [
            ("chunking.iso.max", "chunking.iso.min", self.iso),
            ("chunking.dpdp.max", "chunking.dpdp.min", self.dpdp),
            ("chunking.rbi.max", "chunking.rbi.min", self.rbi),
            ("chunking.general.max", "chunking.general.min", self.general),
        ];
        for (max_field, min_field, sizes) in windows {
            if sizes.max == 0 {
                return Err(invalid(max_field, "must be at least 1"));
            }
            if sizes.min > sizes.max {
                return Err(invalid(min_field, "must not exceed the maximum chunk size"));
            }
            if self.overlap >= sizes.min {
                return Err(invalid(
                    "chunking.overlap",
                    &format!("must be smaller than {min_field}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub json_format: bool,
    pub filter: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl Settings {
    /// Reads `appsettings.{environment}` when present, then `APP_`
    /// variables such as `APP_LLM__PROVIDER=ollama`.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let settings: Settings = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("appsettings.{}", environment.as_str()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.processing.worker_count == 0 {
            return Err(invalid("processing.worker_count", "must be at least 1"));
        }
        self.chunking.validate()?;
        if self.llm.provider.requires_api_key() && self.llm.api_key.trim().is_empty() {
            return Err(invalid(
                "llm.api_key",
                &format!("required for provider {}", self.llm.provider.as_str()),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
