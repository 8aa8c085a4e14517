//! skindose CLI - beam geometry and skin-cell hit testing
//!
//! Reads a settings file, the procedure's irradiation events and a phantom
//! surface, and writes beam/detector geometry and hit flags as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

mod report;
mod run;
mod settings;

use run::{needs_phantom, RunInput};
use settings::{Mode, Settings};

#[derive(Parser)]
#[command(name = "skindose")]
#[command(about = "X-ray beam geometry and skin-cell hit testing", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the mode selected in a settings file
    Run {
        /// Path to the settings .toml file
        settings: PathBuf,
        /// Override the settings file's mode
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,
        /// Override the settings file's event index
        #[arg(short, long)]
        event: Option<usize>,
        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a settings file and the data it points to
    Check {
        /// Path to the settings .toml file
        settings: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Run {
            settings,
            mode,
            event,
            output,
        } => run_settings(&settings, mode, event, output.as_deref()),
        Commands::Check { settings } => check_settings(&settings),
    }
}

fn run_settings(
    path: &Path,
    mode: Option<Mode>,
    event: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    let mut settings = Settings::load(path)?;
    if let Some(mode) = mode {
        settings.mode = mode;
    }
    if let Some(event) = event {
        settings.event_index = event;
    }
    info!("loaded settings from {} (mode {})", path.display(), settings.mode.as_str());

    if let Some(threads) = settings.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to set thread pool size")?;
        info!("using {threads} threads");
    }

    let events = settings.load_events()?;
    info!("loaded {} irradiation events", events.len());

    let phantom = if needs_phantom(settings.mode) {
        let p = settings.load_phantom()?;
        info!("loaded {} phantom with {} skin cells", p.kind(), p.len());
        Some(p)
    } else {
        None
    };

    let report = run::run(&RunInput::from_settings(&settings, &events, phantom.as_ref()))?;
    let json = serde_json::to_string_pretty(&report)?;

    match output {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))?;
            info!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn check_settings(path: &Path) -> Result<()> {
    let settings = Settings::load(path)?;
    let events = settings.load_events()?;

    let mut invalid = 0;
    for (i, event) in events.iter().enumerate() {
        if let Err(err) = event.validate() {
            log::warn!("event {i}: {err}");
            invalid += 1;
        }
    }

    let phantom = settings.load_phantom()?;

    println!("Mode:     {}", settings.mode.as_str());
    println!("Events:   {} ({} invalid)", events.len(), invalid);
    println!("Phantom:  {} ({} skin cells)", phantom.kind(), phantom.len());

    if invalid > 0 && !settings.skip_invalid_events {
        anyhow::bail!("{invalid} invalid events and skip_invalid_events = false");
    }
    Ok(())
}
