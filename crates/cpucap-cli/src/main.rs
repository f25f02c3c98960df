//! `cpucap` - drive the capacity override table from the command line

mod logging;
mod session;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cpucap::{spec, OverrideConfig, OverrideController};
use logging::Verbosity;
use session::TableFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "cpucap",
    version,
    about = "Runtime override of per-unit capacity values"
)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a capacity spec without applying it
    Check {
        /// Spec such as "0-3:1024,4-7:512"
        spec: String,
    },
    /// Load the table and serve attribute commands from stdin
    Session(SessionArgs),
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// TOML table configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of units (overrides the config file)
    #[arg(long)]
    units: Option<usize>,

    /// Maximum capacity (overrides the config file)
    #[arg(long)]
    max_capacity: Option<u64>,

    /// Load-time capacities parameter
    #[arg(long)]
    capacities: Option<String>,

    /// Print tables as JSON
    #[arg(long)]
    json: bool,
}

impl SessionArgs {
    fn config(&self) -> Result<OverrideConfig> {
        let mut config = match &self.config {
            Some(path) => OverrideConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => OverrideConfig::new(),
        };
        if let Some(units) = self.units {
            config = config.with_units(units);
        }
        if let Some(max_capacity) = self.max_capacity {
            config = config.with_max_capacity(max_capacity);
        }
        if let Some(capacities) = &self.capacities {
            config = config.with_capacities(capacities.clone());
        }
        Ok(config)
    }
}

fn check(text: &str) -> Result<()> {
    let assignments = spec::parse(text).with_context(|| format!("invalid spec '{text}'"))?;
    if assignments.is_empty() {
        println!("empty (no-op)");
    }
    for assignment in assignments {
        println!(
            "units {}-{} ({} total) -> {}",
            assignment.start(),
            assignment.end(),
            assignment.unit_count(),
            assignment.value()
        );
    }
    Ok(())
}

fn run_session(args: &SessionArgs) -> Result<()> {
    let config = args.config()?;
    let controller = OverrideController::load(&config).context("loading capacity table")?;

    let format = if args.json {
        TableFormat::Json
    } else {
        TableFormat::Text
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    session::run(&controller, stdin.lock(), &mut stdout, format).context("session i/o")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_subscriber(Verbosity::from_flags(cli.verbose, cli.quiet));

    match &cli.command {
        Command::Check { spec } => check(spec),
        Command::Session(args) => run_session(args),
    }
}
