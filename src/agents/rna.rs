//! Transcriptomics agent
//!
//! Decides whether a query wants the analysis pipeline or a conversation.
//! Pipeline requests inspect the data first, let the LLM propose parameters
//! conditioned on the inspection, then materialize the ten-step plan.

use super::{Agent, AgentReply, UploadedFile};
use crate::dispatch::Dispatcher;
use crate::inspect::InspectionReport;
use crate::llm::{ChatMessage, LlmClient};
use crate::prompts::PromptManager;
use crate::utils::error::AppResult;
use crate::utils::output::OutputStyle;
use crate::workflow::{WorkflowPlan, params};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const WORKFLOW_KEYWORDS: [&str; 11] = [
    "workflow", "pipeline", "analyze", "analysis", "run", "execute", "plan",
    "规划", "流程", "分析", "执行",
];

const BIO_KEYWORDS: [&str; 7] = ["pca", "umap", "tsne", "qc", "cluster", "质控", "聚类"];

/// A query is a workflow request when it names the pipeline outright, pairs a
/// data file with an analysis term, or attaches a file with (almost) no text.
pub fn is_workflow_request(query: &str, file_paths: &[String]) -> bool {
    let query = query.to_lowercase();
    let query = query.trim();

    if WORKFLOW_KEYWORDS.iter().any(|kw| query.contains(kw)) {
        return true;
    }

    if !file_paths.is_empty() && BIO_KEYWORDS.iter().any(|kw| query.contains(kw)) {
        return true;
    }

    if !file_paths.is_empty() && query.chars().count() < 5 {
        return true;
    }

    false
}

pub struct RnaAgent {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptManager>,
    dispatcher: Option<Arc<Dispatcher>>,
}

impl RnaAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptManager>,
        dispatcher: Option<Arc<Dispatcher>>,
    ) -> Self {
        Self {
            llm,
            prompts,
            dispatcher,
        }
    }

    /// Deep-inspect the first attached file. Inspection failures are warnings,
    /// never fatal: the plan falls back to default parameters.
    async fn inspect_first(&self, file_paths: &[String]) -> Option<InspectionReport> {
        let path = file_paths.first()?;
        let dispatcher = self.dispatcher.as_ref()?;

        match dispatcher.inspect(Path::new(path)).await {
            Ok(report) => Some(report),
            Err(err) => {
                println!(
                    "⚠️  {}",
                    OutputStyle::warning(&format!("File inspection failed: {}", err))
                );
                None
            }
        }
    }

    async fn generate_plan(&self, query: &str, file_paths: &[String]) -> AppResult<AgentReply> {
        let inspection = self.inspect_first(file_paths).await;

        let extracted =
            params::extract_params(self.llm.as_ref(), query, file_paths, inspection.as_ref())
                .await;

        Ok(AgentReply::Workflow {
            plan: WorkflowPlan::assemble(&extracted),
            file_paths: file_paths.to_vec(),
        })
    }

    async fn chat(
        &self,
        query: &str,
        history: &[ChatMessage],
        file_paths: &[String],
    ) -> AppResult<AgentReply> {
        let mut enhanced_query = query.to_string();

        if !file_paths.is_empty() {
            if let Some(report) = self.inspect_first(file_paths).await {
                enhanced_query = format!(
                    "{}\n\n{}\n\nBased on the inspection results above, please:\n\
                     1. Analyze the data characteristics\n\
                     2. Propose appropriate analysis parameters\n\
                     3. Ask for confirmation before proceeding with analysis",
                    query,
                    report.summary()
                );
            }
        }

        let mut context = HashMap::new();
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

        let system = self.prompts.get_system_prompt("rna_expert", &context)?;

        let mut messages = vec![ChatMessage::system(system)];
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(enhanced_query));

        let answer = self.llm.chat(&messages).await?;
        Ok(AgentReply::Chat(answer))
    }
}

#[async_trait]
impl Agent for RnaAgent {
    fn route(&self) -> &str {
        "rna_agent"
    }

    async fn process_query(
        &self,
        query: &str,
        history: &[ChatMessage],
        files: &[UploadedFile],
    ) -> AppResult<AgentReply> {
        let file_paths = UploadedFile::paths(files);

        if is_workflow_request(query, &file_paths) {
            self.generate_plan(query, &file_paths).await
        } else {
            self.chat(query, history, &file_paths).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatOptions;
    use crate::utils::error::AppError;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// LLM stub that always answers with the same completion
    struct ScriptedLlm {
        completion: String,
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_with_options(
            &self,
            _messages: &[ChatMessage],
            _options: ChatOptions,
        ) -> AppResult<String> {
            Ok(self.completion.clone())
        }
    }

    fn agent_with(completion: &str) -> RnaAgent {
        RnaAgent::new(
            Arc::new(ScriptedLlm {
                completion: completion.to_string(),
            }),
            Arc::new(crate::prompts::PromptManager::builtin()),
            None,
        )
    }

    #[tokio::test]
    async fn test_workflow_request_yields_plan_with_extracted_params() {
        let agent = agent_with("```json\n{\"min_genes\": \"500\", \"max_mt\": \"5\"}\n```");
        let files = [UploadedFile::new("sample.h5ad", "/uploads/sample.h5ad")];

        let reply = agent
            .process_query("run the standard pipeline", &[], &files)
            .await
            .unwrap();

        match reply {
            AgentReply::Workflow { plan, file_paths } => {
                assert_eq!(plan.steps.len(), 10);
                assert_eq!(
                    plan.step("local_qc").unwrap().params.get("min_genes"),
                    Some(&"500".to_string())
                );
                assert_eq!(file_paths, vec!["/uploads/sample.h5ad".to_string()]);
            }
            AgentReply::Chat(text) => panic!("expected workflow reply, got chat: {}", text),
        }
    }

    #[tokio::test]
    async fn test_workflow_request_survives_unusable_extraction_reply() {
        let agent = agent_with("I would rather discuss normalization strategies.");

        let reply = agent.process_query("analyze my data", &[], &[]).await.unwrap();

        match reply {
            AgentReply::Workflow { plan, .. } => {
                // Defaults apply when the model refuses to return JSON
                assert_eq!(
                    plan.step("local_qc").unwrap().params.get("min_genes"),
                    Some(&"200".to_string())
                );
                assert_eq!(
                    plan.step("local_cluster").unwrap().params.get("resolution"),
                    Some(&"0.5".to_string())
                );
            }
            AgentReply::Chat(text) => panic!("expected workflow reply, got chat: {}", text),
        }
    }

    #[tokio::test]
    async fn test_chat_request_passes_through_llm_answer() {
        let agent = agent_with("UMAP is a dimensionality reduction method.");

        let reply = agent
            .process_query("what is umap exactly?", &[], &[])
            .await
            .unwrap();

        match reply {
            AgentReply::Chat(answer) => {
                assert_eq!(answer, "UMAP is a dimensionality reduction method.")
            }
            other => panic!("expected chat reply, got {:?}", other),
        }
    }

    /// LLM stub that always fails
    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn chat_with_options(
            &self,
            _messages: &[ChatMessage],
            _options: ChatOptions,
        ) -> AppResult<String> {
            Err(AppError::Network("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_workflow_request_survives_llm_failure() {
        let agent = RnaAgent::new(
            Arc::new(FailingLlm),
            Arc::new(crate::prompts::PromptManager::builtin()),
            None,
        );

        let reply = agent
            .process_query("run the pipeline", &[], &[])
            .await
            .unwrap();

        match reply {
            AgentReply::Workflow { plan, .. } => {
                assert_eq!(
                    plan.step("local_hvg").unwrap().params.get("n_top_genes"),
                    Some(&"2000".to_string())
                );
            }
            other => panic!("expected workflow reply, got {:?}", other),
        }
    }

    #[test]
    fn test_workflow_keyword_triggers_without_files() {
        assert!(is_workflow_request("please run the standard pipeline", &[]));
        assert!(is_workflow_request("Analyze my data", &[]));
        assert!(is_workflow_request("帮我分析一下这个单细胞数据", &[]));
    }

    #[test]
    fn test_bio_keyword_needs_a_file() {
        assert!(!is_workflow_request("what is umap?", &[]));
        assert!(is_workflow_request(
            "umap please",
            &paths(&["/uploads/sample.h5ad"])
        ));
        assert!(is_workflow_request("质控", &paths(&["/uploads/sample.h5ad"])));
    }

    #[test]
    fn test_bare_file_with_short_query_is_workflow() {
        assert!(is_workflow_request("", &paths(&["/uploads/sample.h5ad"])));
        assert!(is_workflow_request("go", &paths(&["/uploads/sample.h5ad"])));
        assert!(!is_workflow_request("", &[]));
    }

    #[test]
    fn test_question_with_file_is_chat() {
        assert!(!is_workflow_request(
            "what does this dataset contain?",
            &paths(&["/uploads/sample.h5ad"])
        ));
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        assert!(is_workflow_request("RUN the Pipeline", &[]));
        assert!(is_workflow_request(
            "PCA it",
            &paths(&["/uploads/sample.h5ad"])
        ));
    }
}
