//! Headless driver: runs the simulation with a simple autopilot and logs the
//! outcome. Useful for soak runs, seed bisection and content tuning.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use starfall_core::commands::{PlayerCommand, PlayerInput};
use starfall_core::constants::TICK_RATE;
use starfall_core::content::ContentDef;
use starfall_core::enums::{EntityKind, GamePhase};
use starfall_core::events::GameEvent;
use starfall_core::state::WorldSnapshot;
use starfall_core::types::Position;
use starfall_sim::{SimConfig, SimulationEngine};

#[derive(Debug, Parser)]
#[command(name = "starfall", about = "Run a headless Starfall simulation")]
struct Args {
    /// RNG seed for the run.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate before stopping (five minutes by default).
    #[arg(long, default_value_t = u64::from(TICK_RATE) * 60 * 5)]
    ticks: u64,

    /// Level to start on.
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Content tables as JSON; the built-in tables are used when omitted.
    #[arg(long)]
    content: Option<PathBuf>,

    /// Write the final snapshot as JSON to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let content = match &args.content {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read content file {}", path.display()))?;
            ContentDef::from_json(&json)
                .with_context(|| format!("failed to parse content file {}", path.display()))?
        }
        None => ContentDef::builtin(),
    };

    let config = SimConfig {
        seed: args.seed,
        content,
        ..SimConfig::default()
    };
    let mut engine = SimulationEngine::new(config).context("content rejected")?;
    engine.queue_command(PlayerCommand::StartRun { level: args.level });

    let mut last = engine.tick();
    for _ in 0..args.ticks {
        if last.phase == GamePhase::GameOver {
            break;
        }
        engine.set_input(autopilot(&last));
        last = engine.tick();
        report(&last);
    }

    let stats = engine.stats();
    info!(
        tick = last.time.tick,
        phase = ?last.phase,
        level = engine.level(),
        score = stats.score,
        kills = stats.kills,
        bosses = stats.bosses_defeated,
        achievements = engine.achievements().len(),
        "run finished"
    );

    if let Some(path) = &args.snapshot {
        let json = serde_json::to_string_pretty(&last).context("failed to serialise snapshot")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Strafe back and forth, fire constantly and aim at the closest hostile.
fn autopilot(snapshot: &WorldSnapshot) -> PlayerInput {
    let phase = snapshot.time.tick as f64 / 45.0;
    let player = snapshot
        .ships
        .iter()
        .find(|ship| ship.kind == EntityKind::Player)
        .map(|ship| ship.position);
    let aim = player.and_then(|from| nearest_hostile(snapshot, from));
    PlayerInput {
        move_x: phase.sin(),
        move_y: 0.0,
        fire: true,
        secondary: snapshot.time.tick % 90 == 0,
        aim,
    }
}

fn nearest_hostile(snapshot: &WorldSnapshot, from: Position) -> Option<Position> {
    snapshot
        .ships
        .iter()
        .filter(|ship| ship.kind != EntityKind::Player)
        .map(|ship| ship.position)
        .min_by(|a, b| from.distance_to(a).total_cmp(&from.distance_to(b)))
}

fn report(snapshot: &WorldSnapshot) {
    for event in &snapshot.events {
        match event {
            GameEvent::BossArrived { boss, .. } => info!(tick = snapshot.time.tick, %boss, "boss arrived"),
            GameEvent::BossDefeated { boss, .. } => info!(tick = snapshot.time.tick, %boss, "boss defeated"),
            GameEvent::PlayerDestroyed { .. } => warn!(tick = snapshot.time.tick, "player destroyed"),
            other => debug!(tick = snapshot.time.tick, event = ?other),
        }
    }
}
