use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};

use corefreq::commands;
use corefreq::core::config::Settings;

fn interval_arg() -> Arg {
    Arg::new("interval")
        .short('i')
        .long("interval")
        .value_name("MS")
        .help("Polling interval in milliseconds (100-10000)")
        .value_parser(clap::value_parser!(u64))
}

fn build_cli() -> Command {
    Command::new("corefreq")
        .version(env!("CARGO_PKG_VERSION"))
        .about("CPU frequency, temperature and load monitor")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Settings file (defaults to the user config directory)")
                .global(true),
        )
        .arg(
            Arg::new("replay")
                .long("replay")
                .value_name("FILE")
                .help("Replay recorded sensor frames instead of reading hardware")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("monitor")
                .about("Live CPU dashboard in the terminal")
                .arg(interval_arg())
                .arg(
                    Arg::new("view")
                        .long("view")
                        .value_name("VIEW")
                        .help("Initial view")
                        .value_parser(["dashboard", "topology", "sensors", "system"]),
                )
                .arg(
                    Arg::new("log")
                        .long("log")
                        .value_name("FILE")
                        .help("Also write sensor data to this CSV file ({Date} expands to YYYYMMDD)"),
                ),
        )
        .subcommand(
            Command::new("log")
                .about("Write sensor data to CSV until interrupted")
                .arg(interval_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("TEMPLATE")
                        .help("CSV path template ({Date} expands to YYYYMMDD)"),
                )
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_name("N")
                        .help("Stop after N polls have been written")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Print the current CPU snapshot")
                .arg(interval_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output JSON lines")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("watch")
                        .short('w')
                        .long("watch")
                        .help("Keep printing until Ctrl+C")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("system-info")
                .about("Print CPU, board and OS identity")
                .arg(
                    Arg::new("text")
                        .long("text")
                        .help("Readable summary instead of JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("sensors")
                .about("List every raw sensor the provider reports")
                .arg(
                    Arg::new("record")
                        .long("record")
                        .value_name("FILE")
                        .help("Save the reading as a replayable fixture"),
                ),
        )
}

fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    // Loaded before the logger so the file logging section can configure it
    let (settings, settings_path) = commands::load_settings(&matches)?;

    let level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let log_file = settings
        .logging
        .file
        .enabled
        .then_some(settings.logging.file.path.as_str());
    corefreq::init_logging(level, log_file).context("Failed to initialize logging")?;
    log::debug!("{}", Settings::describe_source(&settings_path));

    match matches.subcommand() {
        Some(("monitor", sub_matches)) => commands::monitor(sub_matches, &settings),
        Some(("log", sub_matches)) => commands::data_log(sub_matches, &settings),
        Some(("snapshot", sub_matches)) => commands::snapshot(sub_matches, &settings),
        Some(("system-info", sub_matches)) => commands::system_info(sub_matches, &settings),
        Some(("sensors", sub_matches)) => commands::sensors(sub_matches, &settings),
        _ => {
            println!("Welcome to corefreq!");
            println!("Use 'corefreq --help' for more information.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_explicit_config_path_is_reported() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        let path_arg = path.to_string_lossy().into_owned();
        let matches = build_cli()
            .try_get_matches_from(["corefreq", "--config", path_arg.as_str(), "snapshot"])
            .unwrap();

        let (settings, source) = commands::load_settings(&matches).unwrap();
        assert_eq!(source, path);
        assert_eq!(settings, Settings::default());
        assert!(Settings::describe_source(&source).starts_with("No settings at"));

        settings.save_to(&path).unwrap();
        assert!(Settings::describe_source(&source).starts_with("Settings loaded from"));
    }

    #[test]
    fn test_global_flags_reach_subcommands() {
        let matches = build_cli()
            .try_get_matches_from(["corefreq", "snapshot", "--replay", "frames.json", "--json"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "snapshot");
        assert_eq!(sub.get_one::<String>("replay").map(String::as_str), Some("frames.json"));
        assert!(sub.get_flag("json"));
    }
}
