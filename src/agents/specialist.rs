//! Chat-only specialists
//!
//! Modalities without a dedicated pipeline (genomics, epigenomics,
//! metabolomics, proteomics, spatial omics, imaging) answer through their
//! role prompt only.

use super::{Agent, AgentReply, UploadedFile};
use crate::llm::{ChatMessage, LlmClient};
use crate::prompts::{PromptManager, roles};
use crate::utils::error::AppResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub struct SpecialistAgent {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptManager>,
    route: String,
    expert_role: String,
    specialty: String,
}

impl SpecialistAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptManager>,
        route: impl Into<String>,
        expert_role: impl Into<String>,
        specialty: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            prompts,
            route: route.into(),
            expert_role: expert_role.into(),
            specialty: specialty.into(),
        }
    }

    /// The stock set of placeholder specialists
    pub fn standard_set(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptManager>,
    ) -> Vec<SpecialistAgent> {
        [
            ("dna_agent", "dna_expert", "Genomics"),
            ("epigenomics_agent", "epigenomics_expert", "Epigenomics"),
            ("metabolomics_agent", "metabolomics_expert", "Metabolomics"),
            ("proteomics_agent", "proteomics_expert", "Proteomics"),
            ("spatial_agent", "spatial_expert", "Spatial Omics"),
            ("imaging_agent", "imaging_expert", "Bioimaging"),
        ]
        .into_iter()
        .map(|(route, role, specialty)| {
            SpecialistAgent::new(llm.clone(), prompts.clone(), route, role, specialty)
        })
        .collect()
    }
}

#[async_trait]
impl Agent for SpecialistAgent {
    fn route(&self) -> &str {
        &self.route
    }

    async fn process_query(
        &self,
        query: &str,
        history: &[ChatMessage],
        files: &[UploadedFile],
    ) -> AppResult<AgentReply> {
        let file_paths = UploadedFile::paths(files);

        let mut context = HashMap::new();
        context.insert("specialty".to_string(), self.specialty.clone());
        context.insert(
            "context".to_string(),
            format!(
                "Uploaded files: {}",
                if file_paths.is_empty() {
                    "None".to_string()
                } else {
                    file_paths.join(", ")
                }
            ),
        );

        // Roles without a dedicated template render the generic expert prompt
        let system = if self
            .prompts
            .has_template(&format!("{}_system", self.expert_role))
        {
            self.prompts.get_system_prompt(&self.expert_role, &context)?
        } else {
            self.prompts.get_prompt(
                &format!("{}_system", self.expert_role),
                &context,
                Some(roles::GENERIC_EXPERT),
            )?
        };

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(query.to_string()));

        let answer = self.llm.chat(&messages).await?;
        Ok(AgentReply::Chat(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_covers_non_rna_modalities() {
        // Route names here must match what the router prompt advertises
        let routes: Vec<&str> = [
            "dna_agent",
            "epigenomics_agent",
            "metabolomics_agent",
            "proteomics_agent",
            "spatial_agent",
            "imaging_agent",
        ]
        .to_vec();

        // Construction without a live client is enough to check the wiring
        struct NoopLlm;
        #[async_trait]
        impl crate::llm::LlmClient for NoopLlm {
            async fn chat_with_options(
                &self,
                _messages: &[ChatMessage],
                _options: crate::llm::ChatOptions,
            ) -> AppResult<String> {
                Ok(String::new())
            }
        }

        let llm: Arc<dyn crate::llm::LlmClient> = Arc::new(NoopLlm);
        let prompts = Arc::new(PromptManager::builtin());
        let agents = SpecialistAgent::standard_set(llm, prompts);
        let agent_routes: Vec<&str> = agents.iter().map(|a| a.route()).collect();
        assert_eq!(agent_routes, routes);
    }
}
