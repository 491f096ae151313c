//! Mullvad device cleaner
//! Periodically removes any devices on a Mullvad account that are not in an allowlist

use anyhow::{Context, Result};
use clap::Parser;
use mullvad_device_cleaner::allowlist::DEFAULT_ALLOWLIST_PATH;
use mullvad_device_cleaner::api::DEFAULT_TIMEOUT_SECS;
use mullvad_device_cleaner::cleaner::interval_from_secs;
use mullvad_device_cleaner::error::FATAL_EXIT_CODE;
use mullvad_device_cleaner::{
    Allowlist, Cleaner, CleanerError, Mode, MullvadClient, ThreadSleeper, config,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mullvad-device-cleaner")]
#[command(version, about = "Remove Mullvad account devices that are not in an allowlist", long_about = None)]
struct Cli {
    /// Path to allowlist file (one device name per line)
    #[arg(long, default_value = DEFAULT_ALLOWLIST_PATH)]
    allowlist: PathBuf,

    /// Actually remove non-allowlisted devices (default: dry-run)
    #[arg(long)]
    apply: bool,

    /// Repeat every N seconds (0 = run once)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    interval: i64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            let code = err
                .downcast_ref::<CleanerError>()
                .map(CleanerError::exit_code)
                .unwrap_or(FATAL_EXIT_CODE);
            ExitCode::from(code)
        }
    }
}

fn init_logging(cli: &Cli) {
    // RUST_LOG wins over the flags when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    // An external interrupt ends the run with exit code 0
    ctrlc::set_handler(|| {
        println!("\nShutting down...");
        std::process::exit(0);
    })
    .context("Failed to install signal handler")?;

    let current_dir = std::env::current_dir()?;
    config::load_dotenv(&current_dir)?;

    let account = config::account_number()?;
    let allowlist = Allowlist::load(&cli.allowlist)?;

    let client = MullvadClient::new(&config::api_base(), Duration::from_secs(cli.timeout))?;
    let mode = Mode::from_apply_flag(cli.apply);
    let interval = interval_from_secs(cli.interval);
    tracing::info!(
        api = %client.base(),
        ?mode,
        interval_secs = interval.map(|i| i.as_secs()).unwrap_or(0),
        "Starting device cleaner"
    );

    let cleaner = Cleaner::new(&client, &account, &allowlist, mode);
    cleaner.run(interval, &mut ThreadSleeper)?;
    Ok(())
}
