//! Agent registry and dispatch
//!
//! The hub owns the router and every domain agent. Dispatch is route →
//! lookup → process, with the transcriptomics agent as the safety net for
//! unknown routes.

use super::router::{DEFAULT_ROUTE, RouteDecision, RouterAgent};
use super::{Agent, AgentReply, UploadedFile};
use crate::llm::ChatMessage;
use crate::utils::error::{AppError, AppResult};
use crate::utils::output::OutputStyle;
use std::collections::HashMap;

/// A reply together with how it was routed
#[derive(Debug)]
pub struct DispatchOutcome {
    pub decision: RouteDecision,
    pub reply: AgentReply,
}

pub struct AgentHub {
    router: RouterAgent,
    agents: HashMap<String, Box<dyn Agent>>,
}

impl AgentHub {
    pub fn new(router: RouterAgent) -> Self {
        Self {
            router,
            agents: HashMap::new(),
        }
    }

    pub fn register(&mut self, agent: Box<dyn Agent>) {
        self.agents.insert(agent.route().to_string(), agent);
    }

    pub fn routes(&self) -> Vec<&str> {
        let mut routes: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        routes.sort_unstable();
        routes
    }

    /// Classify the query and hand it to the matching agent
    pub async fn dispatch(
        &self,
        query: &str,
        history: &[ChatMessage],
        files: &[UploadedFile],
    ) -> AppResult<DispatchOutcome> {
        let decision = self.router.route_query(query, files).await?;

        let agent = match self.agents.get(&decision.routing) {
            Some(agent) => agent,
            None => {
                println!(
                    "⚠️  {}",
                    OutputStyle::warning(&format!(
                        "No agent registered for route '{}', falling back to {}",
                        decision.routing, DEFAULT_ROUTE
                    ))
                );
                self.agents.get(DEFAULT_ROUTE).ok_or_else(|| {
                    AppError::Config(format!("Default agent '{}' is not registered", DEFAULT_ROUTE))
                })?
            }
        };

        let reply = agent.process_query(query, history, files).await?;

        Ok(DispatchOutcome { decision, reply })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatOptions, LlmClient};
    use crate::prompts::PromptManager;
    use async_trait::async_trait;
    use std::sync::Arc;

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

    struct EchoAgent {
        route: String,
    }

    #[async_trait]
    impl Agent for EchoAgent {
        fn route(&self) -> &str {
            &self.route
        }

        async fn process_query(
            &self,
            query: &str,
            _history: &[ChatMessage],
            _files: &[UploadedFile],
        ) -> AppResult<AgentReply> {
            Ok(AgentReply::Chat(format!("{}: {}", self.route, query)))
        }
    }

    fn hub_with(completion: &str, routes: &[&str]) -> AgentHub {
        let llm: Arc<dyn LlmClient> = Arc::new(ScriptedLlm {
            completion: completion.to_string(),
        });
        let prompts = Arc::new(PromptManager::builtin());
        let mut hub = AgentHub::new(RouterAgent::new(llm, prompts));
        for route in routes {
            hub.register(Box::new(EchoAgent {
                route: route.to_string(),
            }));
        }
        hub
    }

    #[tokio::test]
    async fn test_dispatch_follows_router_verdict() {
        let verdict = r#"{"modality":"genomics","intent":"qa","confidence":0.9,"routing":"dna_agent"}"#;
        let hub = hub_with(verdict, &["rna_agent", "dna_agent"]);

        let outcome = hub.dispatch("call variants", &[], &[]).await.unwrap();
        assert_eq!(outcome.decision.routing, "dna_agent");
        match outcome.reply {
            AgentReply::Chat(text) => assert_eq!(text, "dna_agent: call variants"),
            other => panic!("expected chat reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_falls_back_for_unknown_route() {
        let verdict = r#"{"modality":"lipidomics","intent":"qa","confidence":0.4,"routing":"lipidomics_agent"}"#;
        let hub = hub_with(verdict, &["rna_agent"]);

        let outcome = hub.dispatch("analyze lipids", &[], &[]).await.unwrap();
        match outcome.reply {
            AgentReply::Chat(text) => assert!(text.starts_with("rna_agent:")),
            other => panic!("expected chat reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dispatch_survives_unparseable_verdict() {
        let hub = hub_with("sorry, I don't know", &["rna_agent"]);
        let outcome = hub.dispatch("hello", &[], &[]).await.unwrap();
        assert_eq!(outcome.decision.routing, "rna_agent");
        assert_eq!(outcome.decision.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_dispatch_without_default_agent_errors() {
        let hub = hub_with("garbage", &["dna_agent"]);
        assert!(hub.dispatch("hello", &[], &[]).await.is_err());
    }
}
