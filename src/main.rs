//! Neura Pilot CLI
//!
//! Loads settings and plays the map once for every account token, one
//! account at a time.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use neura_pilot::autopilot::SessionReport;
use neura_pilot::config::Settings;
use neura_pilot::Pilot;

/// Battle automation for the Neura Knights web client
#[derive(Parser, Debug)]
#[command(name = "neura-pilot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (JSON); missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Account session token, repeat or comma-separate for several accounts
    #[arg(short, long = "token", env = "NEURA_TOKEN", value_delimiter = ',', hide_env_values = true)]
    tokens: Vec<String>,

    /// Run the browser without a window
    #[arg(long)]
    headless: bool,

    /// Print the effective settings and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if args.headless {
        settings.automation.headless = true;
    }

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let pilot = Pilot::new(settings)?;
    if args.tokens.is_empty() {
        anyhow::bail!("no session token given (use --token or NEURA_TOKEN)");
    }

    run_accounts(&pilot, &args.tokens)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Accounts run strictly one after another; a failed one does not stop the rest
fn run_accounts(pilot: &Pilot, tokens: &[String]) -> Result<()> {
    let pause = Duration::from_millis(pilot.settings().automation.account_pause_ms);
    let mut failures = 0;

    for (idx, token) in tokens.iter().enumerate() {
        if idx > 0 {
            log::info!("Waiting {}s before the next account", pause.as_secs());
            std::thread::sleep(pause);
        }
        log::info!("Account {}/{}", idx + 1, tokens.len());

        match run_account(pilot, token) {
            Ok(report) => log::info!(
                "Account {} done: {} battles, {} cards, {} damage",
                idx + 1,
                report.battles,
                report.cards_played,
                report.damage_dealt
            ),
            Err(e) => {
                failures += 1;
                log::error!("Account {} failed: {:#}", idx + 1, e);
            }
        }
    }

    if failures == tokens.len() {
        anyhow::bail!("all {} account(s) failed", failures);
    }
    Ok(())
}

#[cfg(feature = "browser")]
fn run_account(pilot: &Pilot, token: &str) -> Result<SessionReport> {
    use neura_pilot::surface::chrome::ChromeSurface;

    let settings = pilot.settings();
    let surface = ChromeSurface::launch(&settings.automation, &settings.geometry, token)
        .context("launching the browser")?;
    let result = pilot.run(&surface);
    if let Err(e) = surface.close() {
        log::warn!("Browser did not close cleanly: {}", e);
    }
    Ok(result?)
}

#[cfg(not(feature = "browser"))]
fn run_account(_pilot: &Pilot, _token: &str) -> Result<SessionReport> {
    anyhow::bail!("built without the `browser` feature; rebuild with `--features browser`")
}
