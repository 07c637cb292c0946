// src/bin/ds_hal_harness.rs
//! Command line runner: parse a profile, run the selected tiers against the
//! simulated HAL and report.
//!
//! Exit status is 0 when every case passed, 1 when a case failed or aborted
//! and 255 when the run could not be set up.

use clap::Parser;
use ds_hal_harness::{HarnessError, HarnessResult, HarnessSettings, Session, SettingsLoader, Tier};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_CASE_FAILED: u8 = 1;
const EXIT_SETUP_FAILED: u8 = 255;

#[derive(Parser, Debug)]
#[command(
    name = "ds-hal-harness",
    author,
    version,
    about = "Run device settings HAL conformance suites against a platform profile",
    long_about = None
)]
struct Cli {
    /// Harness settings file (TOML or JSON)
    #[arg(short = 's', long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Platform profile to test against
    #[arg(short = 'p', long, value_name = "PROFILE")]
    profile: Option<PathBuf>,

    /// Tier to run; repeat for several
    #[arg(short = 't', long = "tier", value_enum)]
    tiers: Vec<Tier>,

    /// Write the JSON run report here
    #[arg(short = 'r', long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// HAL backend to drive
    #[arg(short = 'b', long)]
    backend: Option<String>,

    /// `tracing` filter directive, e.g. `debug` or `ds_hal_harness::suite=trace`
    #[arg(long, value_name = "FILTER")]
    log_filter: Option<String>,

    /// List registered suites and cases without running them
    #[arg(long)]
    list: bool,

    /// Print the parsed capability tables as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    fn load_settings(&self) -> Result<HarnessSettings, ::config::ConfigError> {
        let mut loader = SettingsLoader::new();
        if let Some(path) = &self.settings {
            loader = loader.with_file(path);
        }
        if let Some(profile) = &self.profile {
            loader = loader.set_override("profile_path", profile.display().to_string());
        }
        if let Some(report) = &self.report {
            loader = loader.set_override("report_path", report.display().to_string());
        }
        if !self.tiers.is_empty() {
            let tiers: Vec<String> = self.tiers.iter().map(|t| t.to_string().to_lowercase()).collect();
            loader = loader.set_override("tiers", tiers);
        }
        if let Some(backend) = &self.backend {
            loader = loader.set_override("backend", backend.as_str());
        }
        if let Some(filter) = &self.log_filter {
            loader = loader.set_override("log_filter", filter.as_str());
        }
        loader.load()
    }
}

fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn list(session: &Session) -> HarnessResult<()> {
    for suite in session.suites()? {
        println!("{}", suite.name);
        for name in suite.case_names() {
            println!("  {name}");
        }
    }
    Ok(())
}

fn run(cli: &Cli, settings: HarnessSettings) -> HarnessResult<bool> {
    let mut session = Session::open(settings)?;

    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(session.config()?)?);
        return Ok(true);
    }
    if cli.list {
        list(&session)?;
        return Ok(true);
    }

    let mut hal = session.backend()?;
    let report = session.run(&mut hal)?;
    session.write_report(&report)?;

    for name in report.failed_cases() {
        println!("FAILED {name}");
    }
    println!(
        "{} passed, {} failed, {} aborted ({} cases)",
        report.totals.passed,
        report.totals.failed,
        report.totals.aborted,
        report.totals.total()
    );

    session.close();
    Ok(report.success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("ds-hal-harness: {}", HarnessError::from(err));
            return ExitCode::from(EXIT_SETUP_FAILED);
        }
    };
    init_logging(&settings.log_filter);
    info!(version = ds_hal_harness::VERSION, "ds-hal-harness starting");

    match run(&cli, settings) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_CASE_FAILED),
        Err(err) => {
            error!(phase = %err.phase(), "{err}");
            if err.is_setup_failure() {
                ExitCode::from(EXIT_SETUP_FAILED)
            } else {
                ExitCode::from(EXIT_CASE_FAILED)
            }
        }
    }
}
