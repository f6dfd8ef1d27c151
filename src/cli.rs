use crate::config::{ResolvedConfig, ResolvedConfigFile};
use crate::downloader::{discover, download_with_retry, parse_period, resolve};
use crate::errors::{AppError, AppResult};
use crate::utils;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

/// Parses command-line arguments and executes the requested run.
///
/// This function handles two subcommands:
/// - `cli`: Manual CLI with the period given as a flag
/// - `toml`: Run using a TOML configuration file
///
/// Both subcommands execute the same workflow: parse the period, discover
/// candidate files in the portal listing, resolve the latest version via
/// metadata probes, and download it with retry.
///
/// # Arguments
///
/// * `client` - HTTP client shared by every request of the run
///
/// # Returns
///
/// Returns `Ok(())` when the run finishes, including the reported terminal
/// outcomes (nothing found for the period, download exhausted). Returns an
/// error if:
/// - The configuration is invalid
/// - A listing page fetch fails (discovery aborts)
/// - File I/O fails
pub async fn cli(client: &reqwest::Client) -> AppResult<()> {
    let cmd = Command::new("terceirizados-cli")
        .version(APP_VERSION)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("cli")
                .about("Discover and download the latest file for a period")
                .after_help(
                    "Examples:\n  terceirizados-cli cli -p \"março 2024\"\n  terceirizados-cli cli -p 03/2024 -d data/downloads",
                )
                .arg(
                    Arg::new("period")
                        .short('p')
                        .long("period")
                        .help("Month and year of the file (e.g. 'março 2024' or '03/2024')")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("download_dir")
                        .short('d')
                        .long("download-dir")
                        .help("Directory for the downloaded file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("max_attempts")
                        .short('a')
                        .long("max-attempts")
                        .help("Download attempts before giving up")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        );

    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    match matches.subcommand() {
        Some(("cli", sub)) => {
            let period = sub
                .get_one::<String>("period")
                .expect("period is required")
                .clone();
            let mut resolved_config = ResolvedConfig::default();
            if let Some(dir) = sub.get_one::<PathBuf>("download_dir") {
                resolved_config.download_dir = dir.clone();
            }
            if let Some(&attempts) = sub.get_one::<u32>("max_attempts") {
                resolved_config.max_attempts = attempts;
            }

            report_outcome(run_workflow(client, &period, &resolved_config).await)?;
        }
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .expect("config is required");

            let file_config = ResolvedConfigFile::from_toml_file(config_path)?;
            report_outcome(
                run_workflow(client, &file_config.period, &file_config.resolved).await,
            )?;
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::IoError(format!("Failed to print help: {e}")))?;
        }
    }

    Ok(())
}

/// Executes one discovery + resolution + download run.
///
/// On success the local file path and the original period string are the
/// outputs handed to downstream steps (conversion, upload) that live outside
/// this tool; both are logged in the run summary.
pub async fn run_workflow(
    client: &reqwest::Client,
    period_input: &str,
    config: &ResolvedConfig,
) -> AppResult<()> {
    let started = Instant::now();
    let period_input = period_input.trim();
    let period = parse_period(period_input);

    let candidates = discover(client, config, &period).await?;
    if candidates.is_empty() {
        return Err(AppError::NoCandidatesFound {
            period: period.display_label(),
        });
    }

    let version = resolve(client, config, &candidates)
        .await?
        .ok_or(AppError::NoResolvableVersion)?;

    let result = download_with_retry(client, config, &version.link).await?;

    let size_mb = utils::round_two_decimals(utils::mb_from_bytes(result.bytes));
    info!(
        path = %result.path.display(),
        size_mb = size_mb,
        period = period_input,
        elapsed = %utils::format_duration(started.elapsed()),
        "File ready for downstream processing"
    );

    Ok(())
}

/// Applies the caller policy for terminal outcomes: they are reported and the
/// process finishes cleanly, so an operator can distinguish "nothing to do"
/// from a hard failure. Everything else propagates.
fn report_outcome(result: AppResult<()>) -> AppResult<()> {
    match result {
        Err(e) if e.is_terminal() => {
            error!(outcome = %e, "Run finished without a file");
            Ok(())
        }
        other => other,
    }
}
