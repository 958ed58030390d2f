//! Replay entry point.
//!
//! # Responsibility
//! - Drive the simulated host from a JSON scenario and print the shim's lines.
//! - Keep stdout limited to diagnostic lines; summaries go to the log.

use clap::{Parser, Subcommand};
use log::{info, warn};
use pageprobe_core::{
    init_logging, replay, EventWiringShim, InitArguments, ExtensionConfig, Scenario,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(name = "pageprobe", about = "Replay host events through the pageprobe shim")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Overrides PAGEPROBE_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Overrides PAGEPROBE_LOG_DIR.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON scenario against the simulated host.
    Replay {
        scenario: PathBuf,
        /// Exit non-zero when any listener faulted.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print the core crate version.
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = cli
        .log_level
        .iter()
        .map(|level| format!("log-level={level}"))
        .chain(cli.log_dir.iter().map(|dir| format!("log-dir={}", dir.display())))
        .collect::<InitArguments>();
    let config = match ExtensionConfig::resolve(&overrides) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("pageprobe: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(config.log_level, &config.log_target) {
        eprintln!("pageprobe: {err}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Commands::Version => {
            println!("pageprobe_core version={}", pageprobe_core::core_version());
            ExitCode::SUCCESS
        }
        Commands::Replay { scenario, strict } => ExitCode::from(run_replay(&scenario, strict)),
    }
}

/// Replays the scenario at `path` and returns the process exit status.
///
/// Faults only fail the run when `strict` is set.
fn run_replay(path: &Path, strict: bool) -> u8 {
    let scenario = match Scenario::from_path(path) {
        Ok(scenario) => scenario,
        Err(err) => {
            eprintln!("pageprobe: {err}");
            return EXIT_FAILURE;
        }
    };

    let report = replay(&scenario, &EventWiringShim::stdout());
    info!(
        "event=cli_replay module=cli status=ok scenario={} pages={} loads={} faults={}",
        path.display(),
        report.pages,
        report.loads,
        report.faults.len()
    );
    for fault in &report.faults {
        warn!(
            "event=replay_fault module=cli name={} page_id={} error={}",
            fault.event, fault.page_id, fault.error
        );
    }

    if strict && !report.faults.is_empty() {
        return EXIT_FAILURE;
    }
    EXIT_OK
}

#[cfg(test)]
mod tests {
    use super::{run_replay, Cli, Commands, EXIT_FAILURE, EXIT_OK};
    use clap::Parser;
    use std::path::{Path, PathBuf};

    const FAULTING_SCENARIO: &str = r#"{
        "pages": [
            {
                "uri": "https://example.com/",
                "loads": [
                    {"title": "Example"},
                    {"uri": "https://example.com/blank", "document": false}
                ]
            }
        ]
    }"#;

    fn write_scenario(dir: &Path, raw: &str) -> PathBuf {
        let path = dir.join("scenario.json");
        std::fs::write(&path, raw).expect("write scenario");
        path
    }

    #[test]
    fn parses_replay_with_global_flags() {
        let cli = Cli::try_parse_from([
            "pageprobe",
            "replay",
            "scenario.json",
            "--strict",
            "--log-level",
            "debug",
        ])
        .expect("replay args parse");
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Replay { scenario, strict } => {
                assert_eq!(scenario, PathBuf::from("scenario.json"));
                assert!(strict);
            }
            Commands::Version => panic!("expected replay command"),
        }
    }

    #[test]
    fn strict_replay_fails_when_a_listener_faults() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = write_scenario(temp.path(), FAULTING_SCENARIO);
        assert_eq!(run_replay(&path, true), EXIT_FAILURE);
    }

    #[test]
    fn lenient_replay_succeeds_despite_faults() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = write_scenario(temp.path(), FAULTING_SCENARIO);
        assert_eq!(run_replay(&path, false), EXIT_OK);
    }

    #[test]
    fn strict_replay_succeeds_without_faults() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = write_scenario(
            temp.path(),
            r#"{"pages": [{"uri": "https://example.com/", "loads": [{"title": "Example"}]}]}"#,
        );
        assert_eq!(run_replay(&path, true), EXIT_OK);
    }

    #[test]
    fn replay_of_missing_or_malformed_file_fails() {
        let temp = tempfile::tempdir().expect("temp dir");
        assert_eq!(run_replay(&temp.path().join("absent.json"), false), EXIT_FAILURE);
        let path = write_scenario(temp.path(), "{\"pages\": [");
        assert_eq!(run_replay(&path, false), EXIT_FAILURE);
    }

    #[test]
    fn requires_a_subcommand() {
        assert!(Cli::try_parse_from(["pageprobe"]).is_err());
    }
}
