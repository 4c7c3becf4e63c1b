use crate::cli::InspectArgs;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::inspect::FileInspector;
use crate::utils::output::OutputStyle;
use anyhow::Result;

pub async fn handle_inspect_command(config: Config, args: &InspectArgs) -> Result<()> {
    let inspector = FileInspector::new(&config.general.upload_dir);
    let meta = inspector.generate_metadata(&args.file.display().to_string())?;
    OutputStyle::print_file_meta(&meta);

    if args.deep {
        let dispatcher = Dispatcher::new(&config.tools, &config.general.results_dir);
        let report = dispatcher.inspect(&args.file).await?;
        println!();
        println!("{}", report.summary());
    }

    Ok(())
}
