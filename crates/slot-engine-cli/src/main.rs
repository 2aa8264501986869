//! `slots` CLI — generate booking slots and validate weekly availability from
//! the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Slots for the request's date (stdin → stdout)
//! cat request.json | slots generate
//!
//! # From file to file, with engine config
//! slots generate -i request.json -o slots.json --config slots.toml
//!
//! # Re-pack around bookings instead of the fixed grid
//! slots generate -i request.json --stepping pack-around-bookings
//!
//! # Check a weekly schedule before saving it
//! slots validate -i schedule.json
//!
//! # Dates with at least one free slot
//! slots dates -i request.json --from 2026-03-01 --to 2026-03-31
//! ```
//!
//! Set `RUST_LOG=debug` to see what the engine is doing.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use slot_engine::records::{validate_records, AvailabilityRecord, SlotRecord, SlotRequest};
use slot_engine::{EngineConfig, SteppingPolicy};
use std::io::{self, Read};
use std::process;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Booking slot generation and weekly availability validation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the bookable slots for the request's date
    Generate {
        /// Request JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Override the configured stepping policy
        #[arg(long, value_enum)]
        stepping: Option<Stepping>,
    },
    /// Validate a weekly availability schedule (JSON array of records)
    Validate {
        /// Schedule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List dates in a range that have at least one free slot
    Dates {
        /// Request JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// First date to check (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last date to check, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Stepping {
    FixedGrid,
    PackAroundBookings,
}

impl From<Stepping> for SteppingPolicy {
    fn from(s: Stepping) -> Self {
        match s {
            Stepping::FixedGrid => SteppingPolicy::FixedGrid,
            Stepping::PackAroundBookings => SteppingPolicy::PackAroundBookings,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            input,
            output,
            stepping,
        } => {
            let json = read_input(input.as_deref())?;
            let mut request = SlotRequest::from_json(&json).context("Failed to parse request")?;
            if let Some(stepping) = stepping {
                request.stepping = Some(stepping.into());
            }

            let slots = request
                .generate(&config)
                .context("Failed to generate slots")?;
            log::info!("{} slot(s) available", slots.len());

            let records: Vec<SlotRecord> = slots.iter().map(SlotRecord::from).collect();
            let pretty = serde_json::to_string_pretty(&records)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Validate { input } => {
            let json = read_input(input.as_deref())?;
            let records: Vec<AvailabilityRecord> =
                serde_json::from_str(&json).context("Failed to parse schedule")?;
            let report = validate_records(&records, config.timezone()?)
                .context("Failed to read schedule")?;

            if report.is_empty() {
                println!("Schedule is valid");
            } else {
                for message in report.messages_by_day() {
                    eprintln!("{}", message);
                }
                process::exit(1);
            }
        }
        Commands::Dates { input, from, to } => {
            let json = read_input(input.as_deref())?;
            let request = SlotRequest::from_json(&json).context("Failed to parse request")?;
            let dates = request
                .available_dates(&config, from, to)
                .context("Failed to compute available dates")?;
            for date in dates {
                println!("{}", date);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path)),
        None => Ok(EngineConfig::default()),
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
