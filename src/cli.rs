use crate::commands::{ask, configure, datasets, inspect, plan, submit};
use crate::config::Config;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "omicsagent")]
#[command(about = "Route bioinformatics requests to expert agents and plan analysis pipelines")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Commands {
    pub async fn execute(self, config: Config) -> Result<()> {
        match self {
            Commands::Ask(args) => {
                ask::handle_ask_command(config, &args).await?;
            }
            Commands::Plan(args) => {
                plan::handle_plan_command(config, &args).await?;
            }
            Commands::Inspect(args) => {
                inspect::handle_inspect_command(config, &args).await?;
            }
            Commands::Datasets(args) => {
                datasets::handle_datasets_command(config, &args)?;
            }
            Commands::Submit(args) => {
                submit::handle_submit_command(config, &args).await?;
            }
            Commands::Config(args) => {
                configure::handle_config_command(config, args.command.clone())?;
            }
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a question or request an analysis (routed to the matching expert)
    Ask(AskArgs),

    /// Assemble the standard pipeline plan for a query
    Plan(PlanArgs),

    /// Inspect a data file and print its metadata
    Inspect(InspectArgs),

    /// List available test datasets
    Datasets(DatasetsArgs),

    /// Hand a saved plan to the external runner
    Submit(SubmitArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct AskArgs {
    #[arg(help = "The query to route")]
    pub query: String,

    #[arg(short = 'f', long = "file", help = "Attach a data file")]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct PlanArgs {
    #[arg(help = "The analysis request")]
    pub query: String,

    #[arg(short = 'f', long = "file", help = "Attach a data file")]
    pub files: Vec<PathBuf>,

    #[arg(short = 'o', long, help = "Write the plan JSON to this path")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InspectArgs {
    #[arg(help = "File or 10x directory to inspect")]
    pub file: PathBuf,

    #[arg(long, help = "Also run the external runner's deep inspection")]
    pub deep: bool,
}

#[derive(Args)]
pub struct DatasetsArgs {
    #[arg(long, help = "Print the selection JSON instead of the listing")]
    pub json: bool,
}

#[derive(Args)]
pub struct SubmitArgs {
    #[arg(short, long, help = "Path to a saved plan JSON")]
    pub plan: PathBuf,

    #[arg(short = 'f', long = "file", required = true, help = "Input data file")]
    pub files: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommands>,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Reset configuration to defaults
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_parses_files() {
        let cli = Cli::parse_from([
            "omicsagent",
            "ask",
            "analyze my data",
            "-f",
            "sample.h5ad",
            "-f",
            "matrix.mtx",
        ]);
        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.query, "analyze my data");
                assert_eq!(args.files.len(), 2);
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_submit_requires_file() {
        let result = Cli::try_parse_from(["omicsagent", "submit", "--plan", "plan.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_plan_with_output() {
        let cli = Cli::parse_from(["omicsagent", "plan", "run qc", "-o", "plan.json"]);
        match cli.command {
            Commands::Plan(args) => {
                assert_eq!(args.output, Some(PathBuf::from("plan.json")));
            }
            _ => panic!("expected plan command"),
        }
    }
}
