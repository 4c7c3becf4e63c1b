//! Query routing
//!
//! The router asks the LLM for a JSON verdict over the query and attached
//! files. Any parse failure falls back to the default route instead of
//! failing the request.

use super::UploadedFile;
use crate::llm::{ChatMessage, ChatOptions, LlmClient, extract_json_block};
use crate::prompts::PromptManager;
use crate::utils::error::AppResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_ROUTE: &str = "rna_agent";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDecision {
    #[serde(default)]
    pub modality: String,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub confidence: f64,
    pub routing: String,
}

impl RouteDecision {
    /// Used when classification fails entirely
    pub fn fallback() -> Self {
        Self {
            modality: "transcriptomics".to_string(),
            intent: "unknown".to_string(),
            confidence: 0.0,
            routing: DEFAULT_ROUTE.to_string(),
        }
    }
}

/// Parse the router verdict from a completion, tolerating fences and
/// `<think>` preambles
pub fn parse_route(completion: &str) -> Option<RouteDecision> {
    let json = extract_json_block(completion);
    serde_json::from_str(&json).ok()
}

pub struct RouterAgent {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptManager>,
}

impl RouterAgent {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptManager>) -> Self {
        Self { llm, prompts }
    }

    pub async fn route_query(
        &self,
        query: &str,
        files: &[UploadedFile],
    ) -> AppResult<RouteDecision> {
        let file_list = if files.is_empty() {
            "None".to_string()
        } else {
            files
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut context = HashMap::new();
        context.insert("user_query".to_string(), query.to_string());
        context.insert("uploaded_files".to_string(), file_list);

        let system = self.prompts.get_system_prompt("router", &context)?;

        let messages = [
            ChatMessage::system(system),
            ChatMessage::user(query.to_string()),
        ];

        let options = ChatOptions {
            temperature: Some(0.1),
            max_tokens: Some(512),
        };

        let completion = match self.llm.chat_with_options(&messages, options).await {
            Ok(c) => c,
            // Routing must never take the request down with it
            Err(_) => return Ok(RouteDecision::fallback()),
        };

        Ok(parse_route(&completion).unwrap_or_else(RouteDecision::fallback))
    }
}
