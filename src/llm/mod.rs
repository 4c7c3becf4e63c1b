//! LLM client abstraction
//!
//! Both routing and parameter extraction go through a hosted chat-completions
//! API. The trait keeps agents testable without network access.

pub mod openai;

pub use openai::OpenAiClient;

use crate::utils::error::AppResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-request overrides; `None` falls back to the configured defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat_with_options(
        &self,
        messages: &[ChatMessage],
        options: ChatOptions,
    ) -> AppResult<String>;

    async fn chat(&self, messages: &[ChatMessage]) -> AppResult<String> {
        self.chat_with_options(messages, ChatOptions::default())
            .await
    }
}

/// Split a `<think>…</think>` reasoning block off the front of a completion.
///
/// Returns `(think, answer)`; `think` is `None` when the model produced no
/// reasoning block.
pub fn split_think(completion: &str) -> (Option<String>, String) {
    let trimmed = completion.trim_start();
    let Some(rest) = trimmed.strip_prefix("<think>") else {
        return (None, completion.trim().to_string());
    };

    match rest.split_once("</think>") {
        Some((think, answer)) => (
            Some(think.trim().to_string()),
            answer.trim().to_string(),
        ),
        // Unterminated block: treat everything as reasoning
        None => (Some(rest.trim().to_string()), String::new()),
    }
}

/// Extract a JSON payload from a completion that may wrap it in a
/// ```json fence and/or a `<think>` preamble.
pub fn extract_json_block(completion: &str) -> String {
    let (_, answer) = split_think(completion);

    if let Some(after) = answer.split("```json").nth(1)
        && let Some(body) = after.split("```").next()
    {
        return body.trim().to_string();
    }
    if let Some(after) = answer.split("```").nth(1)
        && let Some(body) = after.split("```").next()
    {
        return body.trim().to_string();
    }

    answer.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_think_plain_answer() {
        let (think, answer) = split_think("just an answer");
        assert!(think.is_none());
        assert_eq!(answer, "just an answer");
    }

    #[test]
    fn test_split_think_with_block() {
        let (think, answer) = split_think("<think>step by step</think>\n\nfinal answer");
        assert_eq!(think.as_deref(), Some("step by step"));
        assert_eq!(answer, "final answer");
    }

    #[test]
    fn test_split_think_unterminated() {
        let (think, answer) = split_think("<think>still going");
        assert_eq!(think.as_deref(), Some("still going"));
        assert!(answer.is_empty());
    }

    #[test]
    fn test_extract_json_block_fenced() {
        let raw = "<think>pick params</think>\n```json\n{\"resolution\": \"0.8\"}\n```";
        assert_eq!(extract_json_block(raw), "{\"resolution\": \"0.8\"}");
    }

    #[test]
    fn test_extract_json_block_bare() {
        assert_eq!(
            extract_json_block("{\"min_genes\": \"500\"}"),
            "{\"min_genes\": \"500\"}"
        );
    }

    #[test]
    fn test_extract_json_block_plain_fence() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_block(raw), "{\"a\": 1}");
    }
}
