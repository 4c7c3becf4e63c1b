use crate::cli::DatasetsArgs;
use crate::config::Config;
use crate::testdata::TestDataManager;
use crate::utils::output::OutputStyle;
use anyhow::Result;

pub fn handle_datasets_command(config: Config, args: &DatasetsArgs) -> Result<()> {
    let manager = TestDataManager::new(&config.general.test_data_dir);
    let datasets = manager.scan();

    if args.json {
        println!("{}", TestDataManager::to_selection_json(&datasets));
    } else {
        OutputStyle::print_datasets(&datasets);
    }

    Ok(())
}
