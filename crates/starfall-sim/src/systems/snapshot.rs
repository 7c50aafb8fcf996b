//! Snapshot system: queries the entity store and builds a complete
//! `WorldSnapshot`.
//!
//! This system is read-only. Every list is ordered by creation sequence so
//! identical runs serialise identically.

use hecs::World;

use starfall_core::components::*;
use starfall_core::enums::*;
use starfall_core::events::GameEvent;
use starfall_core::registry::ContentRegistry;
use starfall_core::state::*;
use starfall_core::types::{Position, SimTime, Velocity};

use crate::store::EntityStore;
use crate::systems::boss::BossPhaseController;
use crate::systems::stats::RunStats;

/// Build a complete WorldSnapshot from the current world state.
#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    world: &World,
    registry: &ContentRegistry,
    time: &SimTime,
    phase: GamePhase,
    paused: bool,
    level: u32,
    boss: &BossPhaseController,
    stats: &RunStats,
    events: Vec<GameEvent>,
    achievements_unlocked: Vec<String>,
) -> WorldSnapshot {
    WorldSnapshot {
        time: *time,
        phase,
        paused,
        level,
        ships: build_ships(world, registry),
        projectiles: build_projectiles(world),
        power_ups: build_power_ups(world),
        hazards: build_hazards(world),
        boss: build_boss(world, boss),
        score: build_score(world, time, stats),
        events,
        achievements_unlocked,
    }
}

fn build_ships(world: &World, registry: &ContentRegistry) -> Vec<ShipView> {
    let mut ships: Vec<(u64, ShipView)> = world
        .query::<(
            &Ship,
            &Position,
            &Velocity,
            &Health,
            &Body,
            &BehaviorState,
            &SpawnInfo,
            &Lifecycle,
            Option<&BossProfile>,
        )>()
        .iter()
        .filter(|(_, (.., life, _))| life.alive)
        .map(|(entity, (ship, pos, vel, health, body, behavior, info, _, profile))| {
            let archetype = match ship.kind {
                EntityKind::Player => "player".to_string(),
                EntityKind::Enemy => ship
                    .archetype
                    .and_then(|a| registry.enemy(a))
                    .map(|spec| spec.key.clone())
                    .unwrap_or_default(),
                EntityKind::Boss => profile
                    .and_then(|p| registry.boss(p.boss))
                    .map(|spec| spec.key.clone())
                    .unwrap_or_default(),
            };
            let view = ShipView {
                id: EntityStore::id(entity),
                kind: ship.kind,
                archetype,
                position: *pos,
                velocity: *vel,
                health: health.current,
                max_health: health.max,
                radius: body.radius,
                behavior: behavior.tag(),
                hint: behavior.visual_hint(),
            };
            (info.seq, view)
        })
        .collect();
    ships.sort_by_key(|(seq, _)| *seq);
    ships.into_iter().map(|(_, view)| view).collect()
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<(u64, ProjectileView)> = world
        .query::<(&Projectile, &Position, &Velocity, &SpawnInfo, &Lifecycle)>()
        .iter()
        .filter(|(_, (.., life))| life.alive)
        .map(|(entity, (proj, pos, vel, info, _))| {
            let view = ProjectileView {
                id: EntityStore::id(entity),
                owner: proj.owner,
                faction: proj.faction,
                position: *pos,
                velocity: *vel,
                radius: proj.radius,
                pierce: proj.flags.pierce,
                homing: proj.flags.homing,
                explosive: proj.flags.explosive,
            };
            (info.seq, view)
        })
        .collect();
    projectiles.sort_by_key(|(seq, _)| *seq);
    projectiles.into_iter().map(|(_, view)| view).collect()
}

fn build_power_ups(world: &World) -> Vec<PowerUpView> {
    let mut power_ups: Vec<(u64, PowerUpView)> = world
        .query::<(&PowerUp, &Position, &SpawnInfo, &Lifecycle)>()
        .iter()
        .filter(|(_, (.., life))| life.alive)
        .map(|(entity, (power_up, pos, info, _))| {
            let view = PowerUpView {
                id: EntityStore::id(entity),
                kind: power_up.kind,
                position: *pos,
                radius: power_up.radius,
            };
            (info.seq, view)
        })
        .collect();
    power_ups.sort_by_key(|(seq, _)| *seq);
    power_ups.into_iter().map(|(_, view)| view).collect()
}

fn build_hazards(world: &World) -> Vec<HazardView> {
    let mut hazards: Vec<(u64, HazardView)> = world
        .query::<(&Hazard, &Position, &SpawnInfo, &Lifecycle)>()
        .iter()
        .filter(|(_, (.., life))| life.alive)
        .map(|(entity, (hazard, pos, info, _))| {
            let view = HazardView {
                id: EntityStore::id(entity),
                kind: hazard.kind,
                position: *pos,
                radius: hazard.radius,
                ttl: hazard.ttl,
            };
            (info.seq, view)
        })
        .collect();
    hazards.sort_by_key(|(seq, _)| *seq);
    hazards.into_iter().map(|(_, view)| view).collect()
}

/// Boss view while an encounter is running. Health is read from the boss
/// entity; a boss despawned this tick reports zero.
fn build_boss(world: &World, controller: &BossPhaseController) -> Option<BossView> {
    let state = controller.state()?;
    let (health, max_health) = world
        .get::<&Health>(state.entity)
        .map(|h| (h.current, h.max))
        .unwrap_or((0.0, 0.0));
    Some(BossView {
        id: EntityStore::id(state.entity),
        boss: state.key.clone(),
        phase: state.phase,
        max_phases: state.max_phases,
        health,
        max_health,
        attack_cooldown_ticks: state.attack_cooldown,
    })
}

fn build_score(world: &World, time: &SimTime, stats: &RunStats) -> ScoreView {
    let player = world
        .query::<(&Ship, &Health, Option<&Energy>, Option<&Loadout>)>()
        .iter()
        .find(|(_, (ship, ..))| ship.kind == EntityKind::Player)
        .map(|(_, (_, health, energy, loadout))| {
            (
                health.current,
                energy.map(|e| e.current).unwrap_or(0.0),
                loadout.map(|l| l.level).unwrap_or(1),
            )
        });
    let (player_health, player_energy, upgrade_level) = player.unwrap_or((0.0, 0.0, 1));
    ScoreView {
        score: stats.score,
        kills: stats.kills,
        bosses_defeated: stats.bosses_defeated,
        player_health,
        player_energy,
        upgrade_level,
        survival_secs: stats.survival_ticks as f64 * time.dt(),
    }
}
