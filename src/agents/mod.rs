//! Expert agents
//!
//! Each omics modality gets an agent. The router classifies a query into a
//! modality and the hub dispatches to the matching agent, defaulting to the
//! transcriptomics agent when the route is unknown.

pub mod hub;
pub mod rna;
pub mod router;
pub mod specialist;

pub use hub::AgentHub;
pub use rna::RnaAgent;
pub use router::{RouteDecision, RouterAgent};
pub use specialist::SpecialistAgent;

use crate::llm::ChatMessage;
use crate::utils::error::AppResult;
use crate::workflow::WorkflowPlan;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A file the user attached to the request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub path: String,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Agents only ever handle paths, never file contents
    pub fn paths(files: &[UploadedFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                if f.path.is_empty() {
                    f.name.clone()
                } else {
                    f.path.clone()
                }
            })
            .filter(|p| !p.is_empty())
            .collect()
    }
}

/// What an agent produced for a query
#[derive(Debug, Clone)]
pub enum AgentReply {
    /// A conversational answer
    Chat(String),
    /// A materialized pipeline plan ready for the runner
    Workflow {
        plan: WorkflowPlan,
        file_paths: Vec<String>,
    },
}

#[async_trait]
pub trait Agent: Send + Sync {
    /// Route key this agent answers to (e.g. "rna_agent")
    fn route(&self) -> &str;

    async fn process_query(
        &self,
        query: &str,
        history: &[ChatMessage],
        files: &[UploadedFile],
    ) -> AppResult<AgentReply>;
}
