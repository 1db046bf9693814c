//! `negotiate` CLI: find meeting slots and negotiate calendar conflicts over
//! JSON scenario files.
//!
//! ## Usage
//!
//! ```sh
//! # Ranked proposals for the scenario's meeting request
//! negotiate slots -i scenario.json
//!
//! # Execute the best proposal and print the outcome plus the final calendar
//! negotiate schedule -i scenario.json
//!
//! # Execute the second proposal, with office hours from a config file
//! negotiate --config office.toml schedule -i scenario.json --proposal 1
//!
//! # Priority of a single event (stdin → stdout)
//! cat event.json | negotiate priority
//!
//! # Merged availability for selected participants
//! negotiate availability -i scenario.json --participant ann@example.com
//!
//! # Human-readable summary of the best proposal
//! negotiate -v explain -i scenario.json
//! ```

use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use negotiation_engine::availability::{Agenda, Availability, PrivacyLevel};
use negotiation_engine::summary::{describe_outcome, describe_proposal};
use negotiation_engine::{
    BusinessHours, BusyPeriod, Event, FreeSlot, InMemoryEventStore, MeetingProposal,
    MeetingRequest, NegotiationOutcome, Scenario, Scheduler, SchedulingConfig, SchedulingError,
    TimeWindow,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "negotiate",
    version,
    about = "Find meeting slots and negotiate calendar conflicts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Scheduling configuration file (TOML); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log to stderr: -v for info, -vv for debug (RUST_LOG overrides)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print ranked meeting proposals as JSON
    Slots {
        /// Scenario file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Execute a proposal and print the outcome and resulting events as JSON
    Schedule {
        /// Scenario file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Index of the proposal to execute
        #[arg(long, default_value_t = 0)]
        proposal: usize,
        /// Print the selected proposal without touching the calendar
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the effective priority of a single event
    Priority {
        /// Event file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Print merged busy blocks, free slots and business-hours free slots as JSON
    Availability {
        /// Scenario file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Participant to include; repeatable. Defaults to the request's participants
        #[arg(long = "participant")]
        participants: Vec<String>,
        /// Name the busy participants and list each one's rated events
        #[arg(long)]
        full: bool,
    },
    /// Describe the best proposal in plain text
    Explain {
        /// Scenario file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(Serialize)]
struct ScheduleReport<'a> {
    outcome: &'a NegotiationOutcome,
    /// Every event in the calendar after the negotiation.
    events: Vec<Event>,
}

#[derive(Serialize)]
struct AvailabilityReport {
    #[serde(flatten)]
    availability: Availability,
    /// Free slots inside business hours, long enough for the requested meeting.
    business_free: Vec<FreeSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agendas: Option<Vec<Agenda>>,
}

#[derive(Serialize)]
struct DryRun<'a> {
    proposal: &'a MeetingProposal,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Slots { input, output } => {
            let (scheduler, scenario) = open_scenario(input.as_deref(), config)?;
            let (request, window) = request_and_window(&scenario)?;
            let proposals = propose(&scheduler, request, window)?;
            write_output(output.as_deref(), &to_json(&proposals)?)?;
        }
        Commands::Schedule {
            input,
            output,
            proposal,
            dry_run,
        } => {
            let (mut scheduler, scenario) = open_scenario(input.as_deref(), config)?;
            let (request, window) = request_and_window(&scenario)?;
            let mut proposals = propose(&scheduler, request, window)?;
            if proposal >= proposals.len() {
                bail!(
                    "Proposal index {} out of range: only {} proposal(s) available",
                    proposal,
                    proposals.len()
                );
            }
            let chosen = proposals.swap_remove(proposal);

            if dry_run {
                info!(start = %chosen.start, "dry run, calendar left untouched");
                let report = DryRun { proposal: &chosen };
                write_output(output.as_deref(), &to_json(&report)?)?;
                return Ok(());
            }

            let outcome = scheduler
                .execute_negotiation(&chosen)
                .with_context(|| format!("Failed to schedule '{}'", chosen.request.title))?;
            eprint!("{}", describe_outcome(scheduler.hours(), &outcome));
            let report = ScheduleReport {
                outcome: &outcome,
                events: scheduler.store().events(),
            };
            write_output(output.as_deref(), &to_json(&report)?)?;
        }
        Commands::Priority { input } => {
            let raw = read_input(input.as_deref())?;
            let event: Event = serde_json::from_str(&raw).context("Failed to parse event JSON")?;
            let scheduler = Scheduler::new(InMemoryEventStore::new(), config)
                .context("Invalid scheduling configuration")?;
            debug!(event_id = %event.id, title = %event.title, "evaluating priority");
            println!("{}", scheduler.evaluate_priority(&event));
        }
        Commands::Availability {
            input,
            participants,
            full,
        } => {
            let (scheduler, scenario) = open_scenario(input.as_deref(), config)?;
            let window = scenario
                .window
                .context("Scenario has no search window")?;
            let participants = if participants.is_empty() {
                scenario
                    .request
                    .as_ref()
                    .map(MeetingRequest::participants)
                    .context("Pass --participant or add a request to the scenario")?
            } else {
                participants
            };
            let privacy = if full {
                PrivacyLevel::Full
            } else {
                PrivacyLevel::Opaque
            };
            let min_minutes = scenario
                .request
                .as_ref()
                .map_or(scheduler.hours().step.num_minutes(), |r| r.duration_minutes);

            let availability =
                scheduler.availability(&participants, window.start, window.end, privacy);
            let report = AvailabilityReport {
                business_free: availability.business_free(scheduler.hours(), min_minutes),
                agendas: full.then(|| scheduler.agendas(&participants, window.start, window.end)),
                availability,
            };
            write_output(None, &to_json(&report)?)?;
        }
        Commands::Explain { input } => {
            let (scheduler, scenario) = open_scenario(input.as_deref(), config)?;
            let (request, window) = request_and_window(&scenario)?;
            let proposals = propose(&scheduler, request, window)?;
            if let Some(best) = proposals.first() {
                print!("{}", describe_proposal(scheduler.hours(), best));
            }
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) -> Result<()> {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

fn load_config(path: Option<&str>) -> Result<SchedulingConfig> {
    match path {
        Some(path) => SchedulingConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path)),
        None => Ok(SchedulingConfig::default()),
    }
}

/// Parse the scenario and seed a scheduler with its events.
fn open_scenario(
    input: Option<&str>,
    config: SchedulingConfig,
) -> Result<(Scheduler<InMemoryEventStore>, Scenario)> {
    let raw = read_input(input)?;
    let scenario = Scenario::from_json(&raw).context("Failed to parse scenario JSON")?;
    let store = scenario
        .seed_store()
        .context("Failed to load scenario events")?;
    info!(events = store.len(), "loaded scenario");
    let scheduler = Scheduler::new(store, config).context("Invalid scheduling configuration")?;
    Ok((scheduler, scenario))
}

fn request_and_window(scenario: &Scenario) -> Result<(&MeetingRequest, TimeWindow)> {
    let request = scenario
        .request
        .as_ref()
        .context("Scenario has no meeting request")?;
    let window = scenario.window.context("Scenario has no search window")?;
    Ok((request, window))
}

fn propose(
    scheduler: &Scheduler<InMemoryEventStore>,
    request: &MeetingRequest,
    window: TimeWindow,
) -> Result<Vec<MeetingProposal>> {
    match scheduler.propose(request, window.start, window.end) {
        Ok(proposals) => Ok(proposals),
        Err(SchedulingError::NoSlotsFound {
            duration_minutes,
            busy,
            ..
        }) => bail!(
            "No {}-minute slot found for '{}' in the search window. Busy: {}",
            duration_minutes,
            request.title,
            describe_busy(scheduler.hours(), &busy)
        ),
        Err(err) => Err(err).with_context(|| format!("Invalid meeting request '{}'", request.title)),
    }
}

fn describe_busy(hours: &BusinessHours, busy: &[BusyPeriod]) -> String {
    if busy.is_empty() {
        return "none".to_string();
    }
    busy.iter()
        .map(|b| hours.format_dated_range(b.start, b.end))
        .collect::<Vec<_>>()
        .join("; ")
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    out.push('\n');
    Ok(out)
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
            print!("{}", content);
        }
    }
    Ok(())
}
