use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{LlmClient, LlmClientError};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::config::{LlmProvider, LlmSettings};

/// Client for OpenAI-compatible `/chat/completions` endpoints (Groq,
/// Ollama, OpenAI).
pub struct ChatCompletionsClient {
    client: Client,
    provider: LlmProvider,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            request
        } else {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }
}

fn map_send_error(e: reqwest::Error) -> LlmClientError {
    if e.is_timeout() {
        LlmClientError::Timeout
    } else {
        LlmClientError::ApiRequestFailed(e.to_string())
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmClientError> {
        tracing::debug!(
            provider = self.provider.as_str(),
            model = %self.model,
            prompt = %sanitize_prompt(prompt),
            "Sending completion request"
        );

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request_body);
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(map_send_error)?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion_response: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmClientError::Timeout
            } else {
                LlmClientError::InvalidResponse(e.to_string())
            }
        })?;

        completion_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))
    }
}

pub fn create_llm_client(settings: &LlmSettings) -> Result<ChatCompletionsClient, LlmClientError> {
    if settings.provider != LlmProvider::Ollama && settings.api_key.trim().is_empty() {
        return Err(LlmClientError::Configuration(format!(
            "api_key required for {} provider",
            settings.provider.as_str()
        )));
    }

    let client = Client::builder()
        .timeout(settings.timeout())
        .build()
        .map_err(|e| LlmClientError::Configuration(format!("http client: {e}")))?;

    Ok(ChatCompletionsClient {
        client,
        provider: settings.provider,
        base_url: settings.base_url(),
        api_key: settings.api_key.clone(),
        model: settings.model().to_string(),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    })
}
