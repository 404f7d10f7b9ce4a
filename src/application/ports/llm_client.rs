use async_trait::async_trait;

/// Remote completion endpoint used by both extraction stages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmClientError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("request timed out")]
    Timeout,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("configuration: {0}")]
    Configuration(String),
}

impl LlmClientError {
    /// Errors worth another attempt. Malformed output is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmClientError::ApiRequestFailed(_)
                | LlmClientError::RateLimited
                | LlmClientError::Timeout
        )
    }
}
