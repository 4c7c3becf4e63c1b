use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::utils::output::OutputStyle;
use anyhow::Result;

pub fn handle_config_command(config: Config, command: Option<ConfigCommands>) -> Result<()> {
    match command.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => {
            // The API key is masked whether it came from file or env
            let mut shown = config.clone();
            if shown.llm.api_key.is_some() {
                shown.llm.api_key = Some("********".to_string());
            }
            OutputStyle::print_header("Configuration");
            println!("{}", toml::to_string_pretty(&shown)?);
        }
        ConfigCommands::Path => {
            println!("{}", Config::config_file_path().display());
        }
        ConfigCommands::Reset => {
            Config::default().save()?;
            println!(
                "✅ {}",
                OutputStyle::success("Configuration reset to defaults")
            );
        }
    }
    Ok(())
}
