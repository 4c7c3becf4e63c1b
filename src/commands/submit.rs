use super::warn_missing;
use crate::cli::SubmitArgs;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::utils::output::OutputStyle;
use crate::workflow::WorkflowPlan;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

/// The runner takes a single input; extras are dropped with a count so the
/// caller can warn about them.
fn select_input(files: &[PathBuf]) -> Result<(&PathBuf, usize)> {
    match files.split_first() {
        Some((input, rest)) => Ok((input, rest.len())),
        None => bail!("No input files provided"),
    }
}

pub async fn handle_submit_command(config: Config, args: &SubmitArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.plan)
        .with_context(|| format!("Failed to read plan {}", args.plan.display()))?;
    let plan: WorkflowPlan = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse plan {}", args.plan.display()))?;

    warn_missing(&args.files);
    let (input, dropped) = select_input(&args.files)?;
    if dropped > 0 {
        println!(
            "⚠️  {}",
            OutputStyle::warning(&format!(
                "The runner takes a single input; ignoring {} extra attachment(s)",
                dropped
            ))
        );
    }

    println!(
        "🚀 {}",
        OutputStyle::info(&format!(
            "Submitting '{}' ({} steps)",
            plan.workflow_name,
            plan.steps.len()
        ))
    );

    let dispatcher = Dispatcher::new(&config.tools, &config.general.results_dir);
    let receipt = dispatcher.submit(&plan, input).await?;

    OutputStyle::print_receipt(&receipt);
    Ok(())
}
