use super::{to_uploaded_files, warn_missing};
use crate::agents::{RnaAgent, UploadedFile};
use crate::cli::PlanArgs;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::llm::{LlmClient, OpenAiClient};
use crate::prompts::PromptManager;
use crate::utils::output::OutputStyle;
use crate::workflow::WorkflowPlan;
use anyhow::{Context, Result, bail};
use std::sync::Arc;

/// Assemble a plan without going through the router: the user already
/// decided they want the pipeline.
pub async fn handle_plan_command(config: Config, args: &PlanArgs) -> Result<()> {
    config.require_api_key()?;
    warn_missing(&args.files);
    let files = to_uploaded_files(&args.files);

    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(&config.llm)?);
    let prompts = Arc::new(match &config.general.prompt_dir {
        Some(dir) => PromptManager::with_template_dir(dir)?,
        None => PromptManager::builtin(),
    });
    let dispatcher = Arc::new(Dispatcher::new(
        &config.tools,
        &config.general.results_dir,
    ));

    let agent = RnaAgent::new(llm, prompts, Some(dispatcher));
    let plan = generate_plan(&agent, &args.query, &files).await?;

    if let Some(output) = &args.output {
        let content = serde_json::to_string_pretty(&plan)?;
        std::fs::write(output, content)
            .with_context(|| format!("Failed to write plan to {}", output.display()))?;
        println!(
            "✅ {}",
            OutputStyle::success(&format!("Plan written to {}", output.display()))
        );
    } else {
        OutputStyle::print_plan(&plan);
    }

    Ok(())
}

async fn generate_plan(
    agent: &RnaAgent,
    query: &str,
    files: &[UploadedFile],
) -> Result<WorkflowPlan> {
    use crate::agents::{Agent, AgentReply};

    // Force the workflow path even when the phrasing would read as chat
    let query = if crate::agents::rna::is_workflow_request(query, &UploadedFile::paths(files)) {
        query.to_string()
    } else {
        format!("plan: {}", query)
    };

    match agent.process_query(&query, &[], files).await? {
        AgentReply::Workflow { plan, .. } => Ok(plan),
        AgentReply::Chat(_) => bail!("Expected a workflow plan but got a chat reply"),
    }
}
