use std::time::Duration;

use compliance_agent::domain::DocumentType;
use compliance_agent::infrastructure::observability::TracingConfig;
use compliance_agent::presentation::config::{
    ChunkSizes, Environment, LlmProvider, LoggingSettings, Settings, SettingsError,
};

fn valid_settings() -> Settings {
    let mut settings = Settings::default();
    settings.llm.api_key = "test-key".to_string();
    settings
}

#[test]
fn given_defaults_when_reading_settings_then_match_documented_values() {
    let settings = Settings::default();

    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.processing.worker_count, 6);
    assert_eq!(settings.chunking.overlap, 200);
    assert_eq!(
        settings.chunking.sizes_for(DocumentType::Iso),
        ChunkSizes::new(2000, 2500)
    );
    assert_eq!(settings.chunking.sizes_for(DocumentType::Dpdp).max, 2000);
    assert_eq!(settings.chunking.sizes_for(DocumentType::Rbi).max, 2200);
    assert_eq!(settings.chunking.sizes_for(DocumentType::General).max, 2000);
    assert_eq!(settings.llm.provider, LlmProvider::Groq);
    assert_eq!(settings.llm.retry_backoff(), Duration::from_millis(500));
}

#[test]
fn given_api_key_when_validating_defaults_then_passes() {
    assert!(valid_settings().validate().is_ok());
}

#[test]
fn given_groq_without_api_key_when_validating_then_rejects() {
    let result = Settings::default().validate();

    assert!(matches!(
        result,
        Err(SettingsError::Invalid {
            field: "llm.api_key",
            ..
        })
    ));
}

#[test]
fn given_ollama_without_api_key_when_validating_then_passes() {
    let mut settings = Settings::default();
    settings.llm.provider = LlmProvider::Ollama;

    assert!(settings.validate().is_ok());
    assert_eq!(settings.llm.base_url(), "http://localhost:11434/v1");
    assert_eq!(settings.llm.model(), "mistral:latest");
}

#[test]
fn given_zero_workers_when_validating_then_rejects() {
    let mut settings = valid_settings();
    settings.processing.worker_count = 0;

    assert!(matches!(
        settings.validate(),
        Err(SettingsError::Invalid {
            field: "processing.worker_count",
            ..
        })
    ));
}

#[test]
fn given_min_above_max_when_validating_then_rejects() {
    let mut settings = valid_settings();
    settings.chunking.rbi = ChunkSizes::new(3000, 2200);

    assert!(matches!(
        settings.validate(),
        Err(SettingsError::Invalid {
            field: "chunking.rbi.min",
            ..
        })
    ));
}

#[test]
fn given_zero_max_when_validating_then_rejects() {
    let mut settings = valid_settings();
    settings.chunking.general = ChunkSizes::new(0, 0);

    assert!(matches!(
        settings.validate(),
        Err(SettingsError::Invalid {
            field: "chunking.general.max",
            ..
        })
    ));
}

#[test]
fn given_overlap_not_below_min_when_validating_then_rejects() {
    let mut settings = valid_settings();
    settings.chunking.overlap = 1600;

    assert!(matches!(
        settings.validate(),
        Err(SettingsError::Invalid {
            field: "chunking.overlap",
            ..
        })
    ));
}

#[test]
fn given_overlap_below_every_min_when_validating_then_passes() {
    let mut settings = valid_settings();
    settings.chunking.overlap = 1599;

    assert!(settings.validate().is_ok());
}

#[test]
fn given_custom_base_url_with_trailing_slash_when_resolving_then_trims_it() {
    let mut settings = valid_settings();
    settings.llm.base_url = Some("https://llm.internal/v1/".to_string());
    settings.llm.model = Some("llama-3.3-70b".to_string());

    assert_eq!(settings.llm.base_url(), "https://llm.internal/v1");
    assert_eq!(settings.llm.model(), "llama-3.3-70b");
}

#[test]
fn given_environment_names_when_parsing_then_accepts_aliases() {
    assert_eq!(
        Environment::try_from("production".to_string()).unwrap(),
        Environment::Prod
    );
    assert_eq!(
        Environment::try_from(" Local ".to_string()).unwrap(),
        Environment::Local
    );
    assert!(Environment::try_from("staging".to_string()).is_err());
}

#[test]
fn given_logging_filter_when_building_tracing_config_then_uses_it() {
    let logging = LoggingSettings {
        json_format: true,
        filter: Some("warn".to_string()),
    };

    let config = TracingConfig::from_settings("test", &logging);

    assert_eq!(config.environment, "test");
    assert!(config.json_format);
    assert_eq!(config.default_filter, "warn");
}
