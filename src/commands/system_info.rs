use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::Settings;
use crate::ui::system_formatters;

/// Print the machine identity as pretty JSON, or as a readable summary with `--text`.
pub fn execute(matches: &ArgMatches, _settings: &Settings) -> Result<()> {
    let provider = super::open_sensor_provider(matches)?;
    let identity = provider.identity();

    if matches.get_flag("text") {
        system_formatters::print_system_identity(&identity, &provider.topology());
    } else {
        let json =
            serde_json::to_string_pretty(&identity).context("Failed to serialize identity")?;
        println!("{}", json);
    }
    Ok(())
}
