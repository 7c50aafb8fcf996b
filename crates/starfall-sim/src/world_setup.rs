//! Entity spawn factories.
//!
//! Builds the component bundles for the player, enemies, the boss,
//! projectiles, power-ups and hazards. Every entity goes through
//! `EntityStore::spawn`, so each one carries a `SpawnInfo` and a `Lifecycle`.

use glam::DVec2;
use hecs::Entity;
use rand::Rng;

use starfall_behavior::profiles::{init_behavior, initial_velocity};
use starfall_core::components::*;
use starfall_core::constants::*;
use starfall_core::content::{AbilityDef, AbilityPattern};
use starfall_core::enums::*;
use starfall_core::registry::ContentRegistry;
use starfall_core::types::{AbilityId, ArchetypeId, BossId, EntityId, HazardId, Position, PowerUpId, Velocity};

use crate::context::TickContext;
use crate::store::EntityStore;

/// Spawn the player ship at the bottom center of the playfield.
pub fn spawn_player(store: &mut EntityStore, registry: &ContentRegistry, ctx: &TickContext) -> Entity {
    let spec = &registry.player;
    let position = Position::new(
        ctx.playfield.width / 2.0,
        ctx.playfield.height * PLAYER_SPAWN_HEIGHT_FRACTION,
    );
    let entity = store.spawn(
        ctx.tick,
        (
            Ship {
                kind: EntityKind::Player,
                faction: Faction::Player,
                archetype: None,
                contact_damage: 0.0,
                reward: 0,
                dies_on_contact: false,
            },
            ctx.playfield.clamp_inside(position, spec.radius),
            Velocity::default(),
            Health {
                current: spec.health,
                max: spec.health,
            },
            Body {
                radius: spec.radius,
                scale: 1.0,
            },
            BehaviorState::Player { speed: spec.speed },
            Loadout {
                abilities: spec.abilities.clone(),
                level: 1,
            },
            Pilot {
                invulnerable_ticks: 0,
            },
            ActiveEffects::default(),
        ),
    );
    if let Some(energy) = spec.energy {
        let _ = store.world_mut().insert_one(
            entity,
            Energy {
                current: energy.max,
                max: energy.max,
                regen_per_tick: energy.regen_per_tick,
            },
        );
    }
    entity
}

/// Spawn an enemy of `archetype` at `position`, sized by `scale`.
///
/// Health is multiplied by the context's difficulty. Returns `None` for an
/// archetype the registry does not know.
pub fn spawn_enemy<R: Rng + ?Sized>(
    store: &mut EntityStore,
    registry: &ContentRegistry,
    ctx: &TickContext,
    rng: &mut R,
    archetype: ArchetypeId,
    position: Position,
    scale: f64,
) -> Option<Entity> {
    let spec = registry.enemy(archetype)?;
    let health = spec.health * ctx.difficulty;
    let behavior = init_behavior(spec.behavior, spec.speed, position, rng);
    Some(store.spawn(
        ctx.tick,
        (
            Ship {
                kind: EntityKind::Enemy,
                faction: Faction::Hostile,
                archetype: Some(archetype),
                contact_damage: spec.contact_damage,
                reward: spec.reward,
                dies_on_contact: spec.dies_on_contact,
            },
            position,
            initial_velocity(spec.behavior, spec.speed),
            Health {
                current: health,
                max: health,
            },
            Body {
                radius: spec.radius * scale,
                scale,
            },
            behavior,
            Loadout {
                abilities: spec.abilities.clone(),
                level: 1,
            },
        ),
    ))
}

/// Spawn a boss at the top center of the playfield.
pub fn spawn_boss<R: Rng + ?Sized>(
    store: &mut EntityStore,
    registry: &ContentRegistry,
    ctx: &TickContext,
    rng: &mut R,
    boss: BossId,
) -> Option<Entity> {
    let spec = registry.boss(boss)?;
    let position = ctx.playfield.clamp_inside(
        Position::new(ctx.playfield.width / 2.0, spec.radius * 2.0),
        spec.radius,
    );
    let health = spec.health * ctx.difficulty;
    let behavior = init_behavior(spec.behavior, spec.speed, position, rng);
    Some(store.spawn(
        ctx.tick,
        (
            Ship {
                kind: EntityKind::Boss,
                faction: Faction::Hostile,
                archetype: None,
                contact_damage: spec.contact_damage,
                reward: spec.reward,
                dies_on_contact: false,
            },
            BossProfile { boss },
            position,
            initial_velocity(spec.behavior, spec.speed),
            Health {
                current: health,
                max: health,
            },
            Body {
                radius: spec.radius,
                scale: 1.0,
            },
            behavior,
        ),
    ))
}

/// Spawn one projectile of `def` travelling along `direction` (unit vector).
#[allow(clippy::too_many_arguments)]
pub fn spawn_projectile(
    store: &mut EntityStore,
    ctx: &TickContext,
    owner: EntityId,
    faction: Faction,
    ability: AbilityId,
    def: &AbilityDef,
    origin: Position,
    direction: DVec2,
) -> Entity {
    let mut flags = ProjectileFlags::default();
    let mut explosion_radius = 0.0;
    let mut chain = None;
    let mut turn_rate = 0.0;
    match def.pattern {
        AbilityPattern::Single | AbilityPattern::Spread { .. } => {}
        AbilityPattern::Piercing => flags.pierce = true,
        AbilityPattern::Homing { turn_rate: rate } => {
            flags.homing = true;
            turn_rate = rate;
        }
        AbilityPattern::Explosive { radius } => {
            flags.explosive = true;
            explosion_radius = radius;
        }
        AbilityPattern::Chain {
            jumps,
            range,
            falloff,
        } => {
            chain = Some(ChainSpec {
                jumps,
                range,
                falloff,
            });
        }
    }
    store.spawn(
        ctx.tick,
        (
            Projectile {
                owner,
                faction,
                ability,
                damage: def.damage,
                flags,
                ttl: def.ttl_ticks,
                radius: def.radius,
                explosion_radius,
                chain,
                turn_rate,
                struck: Vec::new(),
            },
            origin,
            Velocity::from(direction * def.speed),
        ),
    )
}

/// Drop a power-up at a random in-bounds point.
pub fn spawn_power_up<R: Rng + ?Sized>(
    store: &mut EntityStore,
    registry: &ContentRegistry,
    ctx: &TickContext,
    rng: &mut R,
    id: PowerUpId,
) -> Option<Entity> {
    let def = registry.power_up(id)?;
    let position = random_point(ctx, rng, def.radius);
    Some(store.spawn(
        ctx.tick,
        (
            PowerUp {
                kind: def.kind,
                magnitude: def.magnitude,
                duration_ticks: def.duration_ticks,
                lifetime_ticks: def.lifetime_ticks,
                radius: def.radius,
            },
            position,
            Velocity::default(),
        ),
    ))
}

/// Spawn a hazard. Drifting hazards enter from the top edge heading roughly
/// down; stationary ones appear at a random in-bounds point.
pub fn spawn_hazard<R: Rng + ?Sized>(
    store: &mut EntityStore,
    registry: &ContentRegistry,
    ctx: &TickContext,
    rng: &mut R,
    id: HazardId,
) -> Option<Entity> {
    let def = registry.hazard(id)?;
    let (position, velocity) = if def.speed > 0.0 {
        let (x_lo, x_hi) = ctx.playfield.x_range(def.radius);
        let position = Position::new(rng.gen_range(x_lo..=x_hi), def.radius);
        let heading = DVec2::from_angle(rng.gen_range(-0.3..=0.3)).rotate(DVec2::Y);
        (position, Velocity::from(heading * def.speed))
    } else {
        (random_point(ctx, rng, def.radius), Velocity::default())
    };
    Some(store.spawn(
        ctx.tick,
        (
            Hazard {
                kind: def.kind,
                radius: def.radius,
                intensity: def.intensity,
                ttl: def.ttl_ticks,
            },
            position,
            velocity,
        ),
    ))
}

fn random_point<R: Rng + ?Sized>(ctx: &TickContext, rng: &mut R, half_extent: f64) -> Position {
    let (x_lo, x_hi) = ctx.playfield.x_range(half_extent);
    let (y_lo, y_hi) = ctx.playfield.y_range(half_extent);
    Position::new(rng.gen_range(x_lo..=x_hi), rng.gen_range(y_lo..=y_hi))
}
