//! Omicsagent - routes natural-language bioinformatics requests to
//! domain-specific expert agents
//!
//! Pipeline requests get a fixed ten-step single-cell analysis plan with
//! LLM-proposed parameters; everything else is answered conversationally.
//! All scientific computation is delegated to an external runner.

pub mod agents;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod inspect;
pub mod llm;
pub mod prompts;
pub mod testdata;
pub mod utils;
pub mod workflow;

// Re-export the types most callers need
pub use agents::{Agent, AgentHub, AgentReply, RouteDecision, UploadedFile, hub::DispatchOutcome};
pub use inspect::{FileInspector, FileKind, FileMeta, InspectionReport};
pub use utils::error::{AppError, AppResult};
pub use workflow::{WorkflowParams, WorkflowPlan, WorkflowStep};

use agents::{RnaAgent, RouterAgent, SpecialistAgent};
use dispatch::Dispatcher;
use llm::{ChatMessage, LlmClient, OpenAiClient};
use prompts::PromptManager;
use std::sync::Arc;
use testdata::TestDataManager;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main library interface: the wired-up router plus every domain agent
pub struct OmicsAgent {
    hub: AgentHub,
    dispatcher: Arc<Dispatcher>,
    inspector: FileInspector,
    test_data: TestDataManager,
}

impl OmicsAgent {
    /// Wire up the hub from configuration. Fails when no API key is
    /// resolvable, before any network use.
    pub fn new(config: &config::Config) -> AppResult<Self> {
        config.require_api_key()?;

        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(&config.llm)?);

        let prompts = Arc::new(match &config.general.prompt_dir {
            Some(dir) => PromptManager::with_template_dir(dir)?,
            None => PromptManager::builtin(),
        });

        let dispatcher = Arc::new(Dispatcher::new(
            &config.tools,
            &config.general.results_dir,
        ));

        let mut hub = AgentHub::new(RouterAgent::new(llm.clone(), prompts.clone()));
        hub.register(Box::new(RnaAgent::new(
            llm.clone(),
            prompts.clone(),
            Some(dispatcher.clone()),
        )));
        for agent in SpecialistAgent::standard_set(llm, prompts) {
            hub.register(Box::new(agent));
        }

        Ok(Self {
            hub,
            dispatcher,
            inspector: FileInspector::new(&config.general.upload_dir),
            test_data: TestDataManager::new(&config.general.test_data_dir),
        })
    }

    /// Route a query and let the matching agent handle it
    pub async fn process_query(
        &self,
        query: &str,
        history: &[ChatMessage],
        files: &[UploadedFile],
    ) -> AppResult<DispatchOutcome> {
        self.hub.dispatch(query, history, files).await
    }

    pub fn hub(&self) -> &AgentHub {
        &self.hub
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn inspector(&self) -> &FileInspector {
        &self.inspector
    }

    pub fn test_data(&self) -> &TestDataManager {
        &self.test_data
    }
}
