//! Movement system.
//!
//! Steps every ship through the behavior dispatcher, flies projectiles
//! (homing ones steer), drifts hazards, applies gravity wells to the player,
//! and counts down every ttl, lifetime and effect timer. Anything that
//! expires or leaves the field is destroyed here.

use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;

use starfall_behavior::dispatch::{steer, step, BehaviorContext};
use starfall_core::commands::PlayerInput;
use starfall_core::components::*;
use starfall_core::constants::*;
use starfall_core::enums::{EntityKind, HazardKind, RemovalCause};
use starfall_core::types::{Position, Velocity};

use crate::context::TickContext;
use crate::store::EntityStore;
use crate::systems::targeting::{collect_targets, nearest_opposing, TargetInfo};

/// Run one tick of motion and countdowns.
pub fn run<R: Rng + ?Sized>(
    store: &mut EntityStore,
    ctx: &TickContext,
    rng: &mut R,
    input: &PlayerInput,
) {
    let targets = collect_targets(store.world());
    let mut doomed: Vec<(Entity, RemovalCause)> = Vec::new();

    let world = store.world_mut();
    step_ships(world, ctx, rng, input, &targets, &mut doomed);
    apply_gravity_wells(world, ctx);
    step_projectiles(world, ctx, &targets, &mut doomed);
    step_hazards(world, ctx, &mut doomed);
    step_power_ups(world, &mut doomed);
    tick_player_timers(world);

    for (entity, cause) in doomed {
        store.destroy(entity, cause);
    }
}

fn step_ships<R: Rng + ?Sized>(
    world: &mut World,
    ctx: &TickContext,
    rng: &mut R,
    input: &PlayerInput,
    targets: &[TargetInfo],
    doomed: &mut Vec<(Entity, RemovalCause)>,
) {
    for (entity, (ship, behavior, pos, vel, body, life)) in world.query_mut::<(
        &Ship,
        &mut BehaviorState,
        &mut Position,
        &mut Velocity,
        &Body,
        &Lifecycle,
    )>() {
        if !life.alive {
            continue;
        }
        let nearest = nearest_opposing(targets, ship.faction, *pos, None, |t| t.entity == entity)
            .map(|t| t.position);
        let behavior_ctx = BehaviorContext {
            position: *pos,
            velocity: *vel,
            dt: ctx.dt,
            playfield: ctx.playfield,
            radius: body.radius,
            nearest_opponent: nearest,
            input: (ship.kind == EntityKind::Player).then(|| input.movement()),
        };
        let update = step(behavior, &behavior_ctx, rng);
        *pos = update.position;
        *vel = update.velocity;

        // Bosses and the player never leave; enemies that wander off are culled.
        if ship.kind == EntityKind::Enemy
            && !ctx.playfield.contains(pos, SHIP_CULL_MARGIN + body.radius)
        {
            doomed.push((entity, RemovalCause::OutOfBounds));
        }
    }
}

fn apply_gravity_wells(world: &mut World, ctx: &TickContext) {
    let wells: Vec<(Position, f64, f64)> = world
        .query::<(&Hazard, &Position, &Lifecycle)>()
        .iter()
        .filter(|(_, (hazard, _, life))| life.alive && hazard.kind == HazardKind::GravityWell)
        .map(|(_, (hazard, pos, _))| (*pos, hazard.radius, hazard.intensity))
        .collect();
    if wells.is_empty() {
        return;
    }

    for (_entity, (ship, pos, body, life)) in
        world.query_mut::<(&Ship, &mut Position, &Body, &Lifecycle)>()
    {
        if ship.kind != EntityKind::Player || !life.alive {
            continue;
        }
        for (center, radius, intensity) in &wells {
            if pos.distance_to(center) < *radius {
                let pull = pos.direction_to(center) * *intensity * GRAVITY_WELL_PULL * ctx.dt;
                *pos = ctx.playfield.clamp_inside(pos.offset(pull), body.radius);
            }
        }
    }
}

fn step_projectiles(
    world: &mut World,
    ctx: &TickContext,
    targets: &[TargetInfo],
    doomed: &mut Vec<(Entity, RemovalCause)>,
) {
    for (entity, (proj, pos, vel, life)) in
        world.query_mut::<(&mut Projectile, &mut Position, &mut Velocity, &Lifecycle)>()
    {
        if !life.alive {
            continue;
        }
        proj.struck.clear();

        if proj.flags.homing {
            let owner = proj.owner;
            if let Some(target) = nearest_opposing(targets, proj.faction, *pos, None, |t| t.id == owner) {
                let steered = steer(
                    vel.vec(),
                    pos.direction_to(&target.position),
                    vel.speed(),
                    proj.turn_rate * ctx.dt,
                );
                *vel = Velocity::from(steered);
            }
        }
        *pos = pos.offset(vel.vec() * ctx.dt);

        proj.ttl = proj.ttl.saturating_sub(1);
        if proj.ttl == 0 {
            doomed.push((entity, RemovalCause::Expired));
        } else if !ctx.playfield.contains(pos, PROJECTILE_CULL_MARGIN) {
            doomed.push((entity, RemovalCause::OutOfBounds));
        }
    }
}

fn step_hazards(world: &mut World, ctx: &TickContext, doomed: &mut Vec<(Entity, RemovalCause)>) {
    for (entity, (hazard, pos, vel, life)) in
        world.query_mut::<(&mut Hazard, &mut Position, &Velocity, &Lifecycle)>()
    {
        if !life.alive {
            continue;
        }
        if vel.vec() != DVec2::ZERO {
            *pos = pos.offset(vel.vec() * ctx.dt);
        }
        hazard.ttl = hazard.ttl.saturating_sub(1);
        if hazard.ttl == 0 {
            doomed.push((entity, RemovalCause::Expired));
        } else if !ctx.playfield.contains(pos, SHIP_CULL_MARGIN + hazard.radius) {
            doomed.push((entity, RemovalCause::OutOfBounds));
        }
    }
}

fn step_power_ups(world: &mut World, doomed: &mut Vec<(Entity, RemovalCause)>) {
    for (entity, (power_up, life)) in world.query_mut::<(&mut PowerUp, &Lifecycle)>() {
        if !life.alive {
            continue;
        }
        power_up.lifetime_ticks = power_up.lifetime_ticks.saturating_sub(1);
        if power_up.lifetime_ticks == 0 {
            doomed.push((entity, RemovalCause::Expired));
        }
    }
}

/// Invulnerability and timed power-up effects.
fn tick_player_timers(world: &mut World) {
    for (_entity, pilot) in world.query_mut::<&mut Pilot>() {
        pilot.invulnerable_ticks = pilot.invulnerable_ticks.saturating_sub(1);
    }
    for (_entity, effects) in world.query_mut::<&mut ActiveEffects>() {
        for effect in &mut effects.effects {
            effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
        }
        effects.effects.retain(|e| e.remaining_ticks > 0);
    }
}
