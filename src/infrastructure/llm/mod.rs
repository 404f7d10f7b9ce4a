mod chat_completions_client;

pub use chat_completions_client::{ChatCompletionsClient, create_llm_client};
