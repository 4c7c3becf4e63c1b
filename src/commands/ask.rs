use super::{to_uploaded_files, warn_missing};
use crate::OmicsAgent;
use crate::agents::AgentReply;
use crate::cli::AskArgs;
use crate::config::Config;
use crate::utils::output::OutputStyle;
use anyhow::Result;

pub async fn handle_ask_command(config: Config, args: &AskArgs) -> Result<()> {
    warn_missing(&args.files);
    let files = to_uploaded_files(&args.files);

    let agent = OmicsAgent::new(&config)?;
    let outcome = agent.process_query(&args.query, &[], &files).await?;

    OutputStyle::print_route(&outcome.decision);

    match outcome.reply {
        AgentReply::Chat(answer) => {
            println!("{}", answer);
        }
        AgentReply::Workflow { plan, file_paths } => {
            OutputStyle::print_plan(&plan);
            if !file_paths.is_empty() {
                OutputStyle::print_field_colored(
                    "Input",
                    &file_paths.join(", "),
                    OutputStyle::info,
                );
            }
            println!(
                "{}",
                OutputStyle::muted("Save this plan with `plan -o` and execute it with `submit`.")
            );
        }
    }

    Ok(())
}
