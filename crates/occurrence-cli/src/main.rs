//! `occurrences` CLI: preview the occurrence series of a venue event.
//!
//! ## Usage
//!
//! ```sh
//! # Next six upcoming occurrences (stdin → stdout)
//! cat event.json | occurrences series
//!
//! # Twelve occurrences, past included, in the venue's zone, with a pinned clock
//! occurrences --timezone Europe/Berlin --now 2025-01-01T00:00:00Z \
//!     series -i event.json --count 12 --include-past
//!
//! # Recompute the cached next start
//! occurrences refresh -i event.json
//!
//! # Materialize one date as an override event
//! occurrences clone -i event.json --occurrence 2025-01-16T20:00:00Z
//!
//! # Human-readable recurrence summary
//! occurrences describe -i event.json
//! ```
//!
//! Input is a JSON document `{"event": {..}, "exceptions": [..],
//! "holidays": [..], "existing_slugs": [..]}`; only `event` is required.
//! Logs go to stderr and are controlled by `RUST_LOG` (default `warn`).

use std::collections::HashSet;
use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use occurrence_engine::event::parse_manual_occurrence;
use occurrence_engine::{
    Event, FixedClock, HolidayWindow, InMemoryStore, RecurrenceException, Scheduler,
    SchedulerConfig, SeriesOptions, Zone,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "occurrences",
    version,
    about = "Preview occurrences of recurring venue events"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scheduler settings as JSON (timezone, max_occurrences, horizon_months, ...)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Organization time zone (IANA name); overrides the config file
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Pin "now" (RFC 3339, or local time in the organization zone)
    #[arg(long, global = true)]
    now: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the occurrence series as JSON
    Series {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Maximum number of occurrences
        #[arg(long, default_value_t = 6)]
        count: usize,
        /// Keep occurrences that start before now
        #[arg(long)]
        include_past: bool,
        /// Last start to include (inclusive)
        #[arg(long)]
        horizon: Option<String>,
    },
    /// Recompute the cached next start and print the refresh outcome
    Refresh {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Maximum number of occurrences (defaults to the configured value)
        #[arg(long)]
        count: Option<usize>,
        /// Last start to include; defaults to the configured horizon
        #[arg(long)]
        horizon: Option<String>,
    },
    /// Materialize one occurrence as a standalone override event
    Clone {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Start of the occurrence to materialize
        #[arg(long)]
        occurrence: String,
    },
    /// Print the human-readable recurrence description
    Describe {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

/// Input document shared by all subcommands.
#[derive(Deserialize)]
struct Fixture {
    event: Event,
    #[serde(default)]
    exceptions: Vec<RecurrenceException>,
    #[serde(default)]
    holidays: Vec<HolidayWindow>,
    #[serde(default)]
    existing_slugs: HashSet<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.timezone.as_deref())?;
    let zone = config.zone().context("Invalid organization time zone")?;
    let now = match cli.now.as_deref() {
        Some(raw) => parse_instant(raw, &zone, "--now")?,
        None => Utc::now(),
    };
    let scheduler =
        Scheduler::from_config(config, FixedClock(now)).context("Invalid scheduler settings")?;
    tracing::debug!(timezone = zone.name(), now = %now, "Scheduler ready");

    match cli.command {
        Commands::Series {
            input,
            count,
            include_past,
            horizon,
        } => {
            let fixture = read_fixture(input.as_deref())?;
            let horizon = horizon
                .as_deref()
                .map(|raw| parse_instant(raw, &zone, "--horizon"))
                .transpose()?;
            let options = SeriesOptions::new(count)
                .include_past(include_past)
                .horizon_end(horizon);
            let series = scheduler.build_occurrence_series(
                &fixture.event,
                &fixture.exceptions,
                &fixture.holidays,
                &options,
            );
            print_json(&series)?;
        }
        Commands::Refresh {
            input,
            count,
            horizon,
        } => {
            let mut fixture = read_fixture(input.as_deref())?;
            let horizon = horizon
                .as_deref()
                .map(|raw| parse_instant(raw, &zone, "--horizon"))
                .transpose()?;
            let count = count.unwrap_or(scheduler.config().max_occurrences);
            let mut store = InMemoryStore::new();
            let outcome = scheduler
                .refresh_schedule(
                    &mut fixture.event,
                    &fixture.exceptions,
                    &fixture.holidays,
                    count,
                    horizon,
                    &mut store,
                )
                .context("Failed to refresh schedule")?;
            print_json(&outcome)?;
        }
        Commands::Clone { input, occurrence } => {
            let fixture = read_fixture(input.as_deref())?;
            let start = parse_instant(&occurrence, &zone, "--occurrence")?;
            let clone =
                scheduler.clone_for_occurrence(&fixture.event, start, &fixture.existing_slugs);
            print_json(&clone)?;
        }
        Commands::Describe { input } => {
            let fixture = read_fixture(input.as_deref())?;
            print_json(&fixture.event.recurrence_description())?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Settings from `--config` (or defaults), with `--timezone` applied on top.
fn load_config(path: Option<&str>, timezone: Option<&str>) -> Result<SchedulerConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            SchedulerConfig::from_json_str(&raw)
                .with_context(|| format!("Invalid config file: {}", path))?
        }
        None => SchedulerConfig::default(),
    };
    if let Some(timezone) = timezone {
        config.timezone = timezone.to_string();
    }
    Ok(config)
}

fn parse_instant(raw: &str, zone: &Zone, flag: &str) -> Result<DateTime<Utc>> {
    parse_manual_occurrence(raw, zone).with_context(|| format!("Invalid {} value", flag))
}

fn read_fixture(path: Option<&str>) -> Result<Fixture> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("Failed to parse input JSON")
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

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", pretty);
    Ok(())
}
