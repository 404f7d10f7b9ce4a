mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    ChunkSizes, ChunkingSettings, LlmProvider, LlmSettings, LoggingSettings, ProcessingSettings,
    ServerSettings, Settings, SettingsError, StorageSettings,
};
