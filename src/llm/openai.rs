use super::{ChatMessage, ChatOptions, LlmClient};
use crate::config::LlmConfig;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completions endpoint
pub struct OpenAiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> AppResult<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            AppError::Config(
                "API key not found. Set it in config or use the OMICSAGENT_API_KEY environment variable".to_string(),
            )
        })?;

        Ok(Self {
            client: Client::builder()
                .user_agent(concat!("omicsagent/", env!("CARGO_PKG_VERSION")))
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .map_err(|e| AppError::Network(format!("Failed to create HTTP client: {}", e)))?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_with_options(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.api_base);

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: options.temperature.unwrap_or(self.temperature),
            max_tokens: options.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Failed to reach LLM API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!(
                "Chat completion failed: {} - {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse chat completion: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Llm("Chat completion returned no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    fn test_config(api_base: String) -> LlmConfig {
        LlmConfig {
            api_base,
            model: "deepseek-ai/DeepSeek-V3".to_string(),
            vision_model: None,
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn test_chat_returns_message_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"hello there"}}]}"#,
            )
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(server.url())).unwrap();
        let reply = client.chat(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply, "hello there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_maps_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":"invalid token"}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(server.url())).unwrap();
        let err = client.chat(&[ChatMessage::user("hi")]).await.unwrap_err();
        match err {
            AppError::Llm(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("invalid token"));
            }
            other => panic!("expected Llm error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(&test_config(server.url())).unwrap();
        assert!(client.chat(&[ChatMessage::user("hi")]).await.is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = OpenAiClient::new(&test_config("http://localhost".to_string())).unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test-key"));
    }
}
