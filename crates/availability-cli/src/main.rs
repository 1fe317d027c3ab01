//! `avail` CLI: compute shared free time and propose meeting slots from the
//! command line.
//!
//! ## Usage
//!
//! ```sh
//! # Shared free time for every participant with a calendar (stdin → stdout)
//! cat request.json | avail free
//!
//! # Propose slots using the request's policy, from file to file
//! avail propose -i request.json -o slots.json
//!
//! # Override the policy: continuous scan every 15 minutes, at most 5 slots
//! avail propose -i request.json --step 15 --limit 5
//!
//! # Indented output instead of a single JSON line
//! avail propose -i request.json --pretty
//!
//! # Show per-participant diagnostics on stderr
//! RUST_LOG=debug avail propose -i request.json
//! ```
//!
//! ## Request format
//!
//! ```json
//! {
//!   "window_start": "2026-01-05T00:00:00Z",
//!   "window_end": "2026-01-12T00:00:00Z",
//!   "duration_minutes": 60,
//!   "timezone": "America/Los_Angeles",
//!   "participants": {
//!     "alice@example.com": [{"start": "...", "end": "..."}],
//!     "bob@example.com": null
//!   }
//! }
//! ```
//!
//! A `null` busy list marks a participant without a connected calendar; they
//! are reported under `missing` instead of blocking everyone else.

use std::collections::BTreeMap;
use std::io::{self, Read};

use anyhow::{Context, Result};
use availability_engine::interval::total_minutes;
use availability_engine::participants::availability_from_lookups;
use availability_engine::policy::all_weekdays;
use availability_engine::{
    propose_slots, Availability, GenerationMode, Interval, MissingParticipant, Slot, SlotPolicy,
    Unavailable,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "avail",
    version,
    about = "Shared availability and meeting-slot proposals from free/busy JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log per-participant diagnostics to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the free time shared by every participant with calendar data
    Free {
        /// Input request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Propose meeting slots inside the shared free time
    Propose {
        /// Input request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Maximum number of slots to return
        #[arg(long)]
        limit: Option<usize>,
        /// IANA timezone overriding the request's timezone
        #[arg(long)]
        timezone: Option<String>,
        /// Switch to continuous scanning with this step, in minutes
        #[arg(long)]
        step: Option<i64>,
    },
}

/// Request body shared by both subcommands.
#[derive(Debug, Deserialize)]
struct Request {
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    participants: BTreeMap<String, Option<Vec<Interval>>>,
    #[serde(default)]
    duration_minutes: Option<i64>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    policy: SlotPolicy,
}

#[derive(Serialize)]
struct FreeResponse<'a> {
    free: &'a [Interval],
    total_minutes: i64,
    counted: &'a [String],
    missing: &'a [MissingParticipant],
}

#[derive(Serialize)]
struct ProposeResponse<'a> {
    slots: &'a [Slot],
    missing: &'a [MissingParticipant],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Free { input, output } => {
            let request = read_request(input.as_deref())?;
            let availability = availability(&request)?;

            let response = FreeResponse {
                free: &availability.free,
                total_minutes: total_minutes(&availability.free),
                counted: &availability.counted,
                missing: &availability.missing,
            };
            let json = to_json(&response, cli.pretty)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Propose {
            input,
            output,
            limit,
            timezone,
            step,
        } => {
            let request = read_request(input.as_deref())?;
            let policy = build_policy(&request, limit, timezone, step);
            let availability = availability(&request)?;

            let slots = propose_slots(&availability.free, &policy)
                .context("Failed to propose slots")?;

            let response = ProposeResponse {
                slots: &slots,
                missing: &availability.missing,
            };
            let json = to_json(&response, cli.pretty)?;
            write_output(output.as_deref(), &json)?;
        }
    }

    Ok(())
}

/// Install a stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Layer the request's top-level fields and the command-line flags over the
/// request's policy, in that order.
fn build_policy(
    request: &Request,
    limit: Option<usize>,
    timezone: Option<String>,
    step: Option<i64>,
) -> SlotPolicy {
    let mut policy = request.policy.clone();

    if let Some(duration) = request.duration_minutes {
        policy.duration_minutes = duration;
    }
    if let Some(tz) = &request.timezone {
        policy.timezone = tz.clone();
    }
    if let Some(limit) = limit {
        policy.result_limit = limit;
    }
    if let Some(tz) = timezone {
        policy.timezone = tz;
    }
    if let Some(step_minutes) = step {
        let allowed_days = match policy.mode {
            GenerationMode::Continuous { allowed_days, .. } => allowed_days,
            GenerationMode::Anchored { .. } => all_weekdays(),
        };
        policy.mode = GenerationMode::Continuous {
            step_minutes,
            allowed_days,
        };
    }

    policy
}

fn availability(request: &Request) -> Result<Availability> {
    let lookups = request.participants.iter().map(|(id, busy)| {
        let lookup = busy.clone().ok_or(Unavailable::NoCalendarLinked);
        (id.clone(), lookup)
    });
    availability_from_lookups(lookups, request.window_start, request.window_end)
        .context("Failed to compute shared availability")
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn read_request(path: Option<&str>) -> Result<Request> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse request JSON")
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
