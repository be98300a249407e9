//! Covert Pact Sandbox Runner
//!
//! Spawns a seeded clan population in the sandbox host and drives the
//! decision engine one simulated day at a time, writing every decision as
//! JSONL.

use bevy_ecs::prelude::*;
use clap::Parser;
use pact_core::config::DEFAULT_CONFIG_PATH;
use pact_core::events::{EventLogger, PendingDecisions};
use pact_core::output::{write_stats, StatsCollector};
use pact_core::setup::{spawn_population, PopulationConfig};
use pact_core::{Clock, DecisionMemory, DecisionScheduler, EngineConfig, SandboxWorld, SimRng};
use pact_events::{SimDuration, SimTime};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "pact_sim")]
#[command(about = "Runs the covert pact decision engine against a sandbox world")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of days to simulate
    #[arg(long, default_value_t = 120)]
    days: u64,

    /// Number of clans to spawn
    #[arg(long, default_value_t = 24)]
    clans: usize,

    /// Number of kingdoms the clans are spread over
    #[arg(long, default_value_t = 4)]
    factions: usize,

    /// Engine tuning file; falls back to pacts.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decision event log
    #[arg(long, default_value = "output/decisions.jsonl")]
    events: PathBuf,

    /// Decision memory file, loaded at start when present and saved at the end
    #[arg(long)]
    memory: Option<PathBuf>,

    /// Run statistics
    #[arg(long, default_value = "output/stats.json")]
    stats: PathBuf,

    /// Days a request may stay pending before it expires
    #[arg(long, default_value_t = 14)]
    request_expiry_days: u64,
}

#[derive(Resource)]
struct Engine(DecisionScheduler);

#[derive(Resource)]
struct Sandbox(SandboxWorld);

#[derive(Resource)]
struct RequestExpiry(SimDuration);

/// Marks requests nobody answered in time as expired
fn expire_stale_requests(
    mut sandbox: ResMut<Sandbox>,
    clock: Res<Clock>,
    expiry: Res<RequestExpiry>,
) {
    let expired = sandbox.0.expire_requests(clock.now, expiry.0);
    if expired > 0 {
        info!(expired, "requests expired");
    }
}

/// Runs the engine for the current day
fn run_decision_day(
    mut engine: ResMut<Engine>,
    mut sandbox: ResMut<Sandbox>,
    clock: Res<Clock>,
    mut rng: ResMut<SimRng>,
    mut pending: ResMut<PendingDecisions>,
    mut stats: ResMut<StatsCollector>,
) {
    let report = engine.0.run_day(&mut sandbox.0, clock.now, &mut rng.0);
    stats.record_day(&report);
    pending.extend(report.events);
}

/// Writes the day's decisions to the event log
fn flush_decisions(mut logger: ResMut<EventLogger>, mut pending: ResMut<PendingDecisions>) {
    let mut events = pending.drain();
    if let Err(e) = logger.log_batch(&mut events) {
        warn!(error = %e, "could not write decision events");
    }
    if let Err(e) = logger.flush() {
        warn!(error = %e, "could not flush decision events");
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(EngineConfig::from_file(path)?),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Ok(EngineConfig::from_file(DEFAULT_CONFIG_PATH)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn load_memory(path: Option<&Path>) -> Result<DecisionMemory, Box<dyn Error>> {
    match path {
        Some(path) if path.exists() => {
            let memory = DecisionMemory::load(path)?;
            info!(
                path = %path.display(),
                cooldowns = memory.cooldown_count(),
                "decision memory restored"
            );
            Ok(memory)
        }
        _ => Ok(DecisionMemory::new()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let memory = load_memory(args.memory.as_deref())?;

    info!(
        seed = args.seed,
        days = args.days,
        clans = args.clans,
        factions = args.factions,
        "starting covert pact sandbox"
    );

    if let Some(parent) = args.events.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let population = PopulationConfig {
        clans: args.clans,
        factions: args.factions,
        ..PopulationConfig::default()
    };
    let (sandbox, summary) = spawn_population(&population, &mut rng);
    info!(
        clans = summary.clans,
        independent = summary.independent,
        wars = summary.wars,
        "world ready"
    );

    // Initialize the ECS world
    let mut world = World::new();
    world.insert_resource(Engine(DecisionScheduler::new(config).with_memory(memory)));
    world.insert_resource(Sandbox(sandbox));
    world.insert_resource(Clock::new(SimTime::start()));
    world.insert_resource(SimRng(rng));
    world.insert_resource(RequestExpiry(SimDuration::from_days(args.request_expiry_days)));
    world.insert_resource(EventLogger::new(&args.events)?);
    world.insert_resource(PendingDecisions::new());
    world.insert_resource(StatsCollector::new());

    let mut schedule = Schedule::default();
    schedule.add_systems((expire_stale_requests, run_decision_day, flush_decisions).chain());

    for _ in 0..args.days {
        schedule.run(&mut world);
        world.resource_mut::<Clock>().advance_day();
    }

    let clock = *world.resource::<Clock>();
    let logged = world.resource::<EventLogger>().event_count();
    info!(days = clock.days_run, decisions = logged, date = %clock.now.date(), "run complete");

    if let Some(path) = &args.memory {
        world.resource::<Engine>().0.memory().save(path)?;
        info!(path = %path.display(), "decision memory saved");
    }

    let stats = world
        .resource::<StatsCollector>()
        .generate_stats(clock.days_run, &world.resource::<Sandbox>().0, clock.now);
    write_stats(&stats, &args.stats)?;

    println!("Covert pact sandbox");
    println!("===================");
    println!("Seed: {}  Days: {}  Clans: {}", args.seed, clock.days_run, summary.clans);
    println!("Decisions: {}", stats.total_decisions);
    for (kind, count) in &stats.decisions_by_kind {
        println!("  {:<18} {}", kind, count);
    }
    println!(
        "Coalitions: {} formed, {} active, {} dissolved, {} leaks",
        stats.coalitions.formed,
        stats.coalitions.active,
        stats.coalitions.dissolved,
        stats.coalitions.leaks
    );
    println!("Events written to {}", args.events.display());

    Ok(())
}
