//! Ability firing: per-(entity, ability) cooldowns, energy, and projectile
//! patterns.
//!
//! Cooldown state lives here rather than on the entities, keyed by hecs
//! handle. Entries for removed entities are released during cleanup.

use std::collections::HashMap;
use std::f64::consts::TAU;

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;
use tracing::trace;

use starfall_core::commands::PlayerInput;
use starfall_core::components::*;
use starfall_core::constants::SPREAD_SHOT_STEP;
use starfall_core::content::{AbilityDef, AbilityPattern};
use starfall_core::enums::{EntityKind, Faction, PowerUpKind};
use starfall_core::events::GameEvent;
use starfall_core::registry::ContentRegistry;
use starfall_core::types::{AbilityId, Position};

use crate::context::TickContext;
use crate::store::EntityStore;
use crate::systems::boss::BossPhaseController;
use crate::systems::targeting::find_player;
use crate::world_setup;

/// Effective cooldown in ticks: `max(1, round(base / level))`, further
/// divided by an active rapid-fire multiplier.
pub fn cooldown_interval(base: u64, level: u32, rapid_fire: Option<f64>) -> u64 {
    let multiplier = rapid_fire.filter(|m| *m > 0.0).unwrap_or(1.0);
    let scaled = base as f64 / f64::from(level.max(1)) / multiplier;
    (scaled.round() as u64).max(1)
}

/// Gates firing per (entity, ability) and creates projectiles.
#[derive(Debug, Default)]
pub struct CooldownAbilityManager {
    last_fire: HashMap<(Entity, AbilityId), u64>,
}

impl CooldownAbilityManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_fire(&self, entity: Entity, ability: AbilityId) -> Option<u64> {
        self.last_fire.get(&(entity, ability)).copied()
    }

    pub fn is_ready(&self, entity: Entity, ability: AbilityId, interval: u64, now: u64) -> bool {
        self.last_fire(entity, ability)
            .map_or(true, |last| now.saturating_sub(last) >= interval)
    }

    /// Record a fire at `now` without spawning anything.
    pub fn prime(&mut self, entity: Entity, ability: AbilityId, now: u64) {
        self.last_fire.insert((entity, ability), now);
    }

    /// Prime every ability in the entity's loadout.
    pub fn prime_loadout(&mut self, world: &World, entity: Entity, now: u64) {
        let abilities = match world.get::<&Loadout>(entity) {
            Ok(loadout) => loadout.abilities.clone(),
            Err(_) => return,
        };
        for ability in abilities {
            self.prime(entity, ability, now);
        }
    }

    /// Forget every entry belonging to `entities`.
    pub fn release(&mut self, entities: &[Entity]) {
        if entities.is_empty() {
            return;
        }
        self.last_fire.retain(|(entity, _), _| !entities.contains(entity));
    }

    pub fn clear(&mut self) {
        self.last_fire.clear();
    }

    pub fn len(&self) -> usize {
        self.last_fire.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fire.is_empty()
    }

    /// Fire `ability` from `shooter` at `origin` along `aim`.
    ///
    /// Returns false with no state change while on cooldown or when the
    /// shooter's energy pool cannot cover the cost. On success records the
    /// fire tick, deducts energy, spawns the pattern and emits `AbilityFired`.
    #[allow(clippy::too_many_arguments)]
    pub fn try_fire(
        &mut self,
        store: &mut EntityStore,
        registry: &ContentRegistry,
        ctx: &TickContext,
        shooter: Entity,
        ability: AbilityId,
        origin: Position,
        aim: DVec2,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let Some(def) = registry.ability(ability) else {
            return false;
        };
        let world = store.world();
        let Ok(faction) = world.get::<&Ship>(shooter).map(|ship| ship.faction) else {
            return false;
        };
        let level = world.get::<&Loadout>(shooter).map(|l| l.level).unwrap_or(1);
        let (rapid_fire, spread_shot) = world
            .get::<&ActiveEffects>(shooter)
            .map(|e| {
                (
                    e.magnitude(PowerUpKind::RapidFire),
                    e.magnitude(PowerUpKind::SpreadShot),
                )
            })
            .unwrap_or((None, None));

        let interval = cooldown_interval(def.interval_ticks, level, rapid_fire);
        if !self.is_ready(shooter, ability, interval, ctx.tick) {
            return false;
        }

        if def.energy_cost > 0.0 {
            if let Ok(mut energy) = world.get::<&mut Energy>(shooter) {
                if energy.current < def.energy_cost {
                    return false;
                }
                energy.current -= def.energy_cost;
            }
        }

        self.last_fire.insert((shooter, ability), ctx.tick);

        let extra = match def.pattern {
            AbilityPattern::Single | AbilityPattern::Spread { .. } => {
                spread_shot.map(|m| m.round().max(0.0) as u32).unwrap_or(0)
            }
            _ => 0,
        };
        let count = spawn_pattern(store, ctx, shooter, faction, ability, def, origin, aim, extra);
        events.push(GameEvent::AbilityFired {
            owner: EntityStore::id(shooter),
            ability: def.key.clone(),
            projectiles: count,
        });
        trace!(ability = %def.key, projectiles = count, "ability fired");
        true
    }
}

/// Spawn the projectiles of one activation. Returns how many were created.
#[allow(clippy::too_many_arguments)]
pub fn spawn_pattern(
    store: &mut EntityStore,
    ctx: &TickContext,
    owner: Entity,
    faction: Faction,
    ability: AbilityId,
    def: &AbilityDef,
    origin: Position,
    aim: DVec2,
    extra_pellets: u32,
) -> u32 {
    let base = if aim == DVec2::ZERO {
        default_aim(faction)
    } else {
        aim.normalize()
    };
    let directions = pattern_directions(def.pattern, base, extra_pellets);
    let owner_id = EntityStore::id(owner);
    for dir in &directions {
        world_setup::spawn_projectile(store, ctx, owner_id, faction, ability, def, origin, *dir);
    }
    directions.len() as u32
}

/// Straight up for the player, straight down for everyone else.
pub fn default_aim(faction: Faction) -> DVec2 {
    match faction {
        Faction::Player => DVec2::NEG_Y,
        Faction::Hostile => DVec2::Y,
    }
}

/// Unit directions for a pattern fired along `base`. Extra pellets fan out
/// alternately right and left beyond the pattern's outermost shot.
pub fn pattern_directions(pattern: AbilityPattern, base: DVec2, extra_pellets: u32) -> Vec<DVec2> {
    let mut angles = match pattern {
        AbilityPattern::Spread { count, arc_degrees } => {
            spread_angles(count, arc_degrees.to_radians())
        }
        _ => vec![0.0],
    };
    let half = angles.iter().fold(0.0_f64, |acc, a| acc.max(a.abs()));
    for k in 1..=extra_pellets {
        let side = if k % 2 == 1 { 1.0 } else { -1.0 };
        let step = f64::from((k + 1) / 2);
        angles.push(side * (half + step * SPREAD_SHOT_STEP));
    }
    angles
        .into_iter()
        .map(|a| DVec2::from_angle(a).rotate(base))
        .collect()
}

fn spread_angles(count: u32, arc: f64) -> Vec<f64> {
    if count <= 1 {
        return vec![0.0];
    }
    if arc >= TAU - 1e-9 {
        // Full ring: evenly spaced, no duplicate at 360 degrees.
        let step = TAU / f64::from(count);
        return (0..count).map(|i| f64::from(i) * step).collect();
    }
    let step = arc / f64::from(count - 1);
    (0..count).map(|i| -arc / 2.0 + f64::from(i) * step).collect()
}

/// Regenerate every energy pool by its per-tick rate.
pub fn regen_energy(world: &mut World) {
    for (_entity, energy) in world.query_mut::<&mut Energy>() {
        energy.current = (energy.current + energy.regen_per_tick).min(energy.max);
    }
}

/// Run one tick of firing: energy regen, the player's intents, every enemy
/// at the player, and the boss's attack cadence.
#[allow(clippy::too_many_arguments)]
pub fn run<R: Rng + ?Sized>(
    manager: &mut CooldownAbilityManager,
    store: &mut EntityStore,
    registry: &ContentRegistry,
    ctx: &TickContext,
    input: &PlayerInput,
    boss: &mut BossPhaseController,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    regen_energy(store.world_mut());

    let player = find_player(store.world());

    if let Some((entity, pos)) = player {
        let loadout = store
            .world()
            .get::<&Loadout>(entity)
            .map(|l| l.abilities.clone())
            .unwrap_or_default();
        let aim = input
            .aim
            .map(|target| pos.direction_to(&target))
            .filter(|dir| *dir != DVec2::ZERO)
            .unwrap_or(DVec2::NEG_Y);
        if input.fire {
            if let Some(&primary) = loadout.first() {
                manager.try_fire(store, registry, ctx, entity, primary, pos, aim, events);
            }
        }
        if input.secondary {
            if let Some(&secondary) = loadout.get(1) {
                manager.try_fire(store, registry, ctx, entity, secondary, pos, aim, events);
            }
        }
    }

    let player_pos = player.map(|(_, pos)| pos);
    if let Some(target) = player_pos {
        let mut shooters: Vec<(u64, Entity, Position, Vec<AbilityId>)> = store
            .world()
            .query::<(&Ship, &Position, &Loadout, &SpawnInfo, &Lifecycle)>()
            .iter()
            .filter(|(_, (ship, _, loadout, _, life))| {
                ship.kind == EntityKind::Enemy && life.alive && !loadout.abilities.is_empty()
            })
            .map(|(entity, (_, pos, loadout, info, _))| {
                (info.seq, entity, *pos, loadout.abilities.clone())
            })
            .collect();
        shooters.sort_by_key(|(seq, ..)| *seq);

        for (_, entity, pos, abilities) in shooters {
            let aim = pos.direction_to(&target);
            for ability in abilities {
                manager.try_fire(store, registry, ctx, entity, ability, pos, aim, events);
            }
        }
    }

    boss.attack(manager, store, registry, ctx, rng, player_pos, events);
}
