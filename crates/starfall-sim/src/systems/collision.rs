//! Collision resolution.
//!
//! Circle model: two bodies touch when their center distance is strictly
//! less than the sum of their radii. Runs two pair sets per tick:
//! projectiles against opposing ships, then the player against hostile
//! ships, hazards and power-ups. Entities created this tick are ignored, as
//! are hidden cloaked ships and anything already destroyed.

use hecs::Entity;
use rand::Rng;
use tracing::{debug, info};

use starfall_core::components::*;
use starfall_core::constants::{MAX_UPGRADE_LEVEL, PLAYER_INVULNERABLE_TICKS};
use starfall_core::enums::*;
use starfall_core::events::GameEvent;
use starfall_core::registry::{ContentRegistry, DeathBehavior};
use starfall_core::types::Position;

use crate::context::TickContext;
use crate::store::EntityStore;
use crate::systems::abilities::{spawn_pattern, CooldownAbilityManager};
use crate::systems::boss::{BossPhase, BossPhaseController};
use crate::systems::targeting::{collect_targets, find_player, nearest_opposing, TargetInfo};
use crate::world_setup;

/// Borrowed view of everything collision may touch during one tick.
pub struct CollisionResolver<'a, R: Rng + ?Sized> {
    pub store: &'a mut EntityStore,
    pub registry: &'a ContentRegistry,
    pub ctx: &'a TickContext,
    pub rng: &'a mut R,
    pub cooldowns: &'a mut CooldownAbilityManager,
    pub boss: &'a mut BossPhaseController,
    pub events: &'a mut Vec<GameEvent>,
}

impl<'a, R: Rng + ?Sized> CollisionResolver<'a, R> {
    pub fn resolve(mut self) {
        self.projectile_hits();
        self.player_contacts();
    }

    fn eligible_targets(&self) -> Vec<TargetInfo> {
        let now = self.ctx.tick;
        collect_targets(self.store.world())
            .into_iter()
            .filter(|t| t.spawn_tick < now)
            .collect()
    }

    fn projectile_hits(&mut self) {
        let now = self.ctx.tick;
        let targets = self.eligible_targets();

        let mut projectiles: Vec<(u64, Entity, Projectile, Position)> = self
            .store
            .world()
            .query::<(&Projectile, &Position, &SpawnInfo, &Lifecycle)>()
            .iter()
            .filter(|(_, (_, _, info, life))| life.alive && info.tick < now)
            .map(|(entity, (proj, pos, info, _))| (info.seq, entity, proj.clone(), *pos))
            .collect();
        projectiles.sort_by_key(|(seq, ..)| *seq);

        for (_, entity, mut proj, pos) in projectiles {
            let mut consumed = false;
            for target in &targets {
                if !proj.faction.opposes(target.faction)
                    || target.id == proj.owner
                    || proj.struck.contains(&target.id)
                    || !self.store.is_alive(target.entity)
                {
                    continue;
                }
                if pos.distance_to(&target.position) >= proj.radius + target.radius {
                    continue;
                }

                proj.struck.push(target.id);
                self.apply_damage(target.entity, proj.damage);
                if proj.flags.explosive {
                    self.explode(&targets, &mut proj, pos);
                }
                if let Some(chain) = proj.chain {
                    self.chain(&targets, &mut proj, target, chain);
                }
                if !proj.flags.pierce {
                    self.store.destroy(entity, RemovalCause::Consumed);
                    consumed = true;
                    break;
                }
            }

            if !consumed && !proj.struck.is_empty() {
                if let Ok(mut live) = self.store.world().get::<&mut Projectile>(entity) {
                    live.struck = proj.struck;
                }
            }
        }
    }

    /// Full damage to every other opposing ship within the blast.
    fn explode(&mut self, targets: &[TargetInfo], proj: &mut Projectile, at: Position) {
        for other in targets {
            if !proj.faction.opposes(other.faction)
                || other.id == proj.owner
                || proj.struck.contains(&other.id)
                || !self.store.is_alive(other.entity)
            {
                continue;
            }
            if at.distance_to(&other.position) < proj.explosion_radius + other.radius {
                proj.struck.push(other.id);
                self.apply_damage(other.entity, proj.damage);
            }
        }
    }

    fn chain(&mut self, targets: &[TargetInfo], proj: &mut Projectile, first: &TargetInfo, chain: ChainSpec) {
        let mut from = first.position;
        let mut damage = proj.damage;
        for _ in 0..chain.jumps {
            let store = &*self.store;
            let owner = proj.owner;
            let struck = &proj.struck;
            let Some(next) = nearest_opposing(targets, proj.faction, from, Some(chain.range), |t| {
                t.id == owner || struck.contains(&t.id) || !store.is_alive(t.entity)
            }) else {
                break;
            };
            damage *= chain.falloff;
            proj.struck.push(next.id);
            self.apply_damage(next.entity, damage);
            from = next.position;
        }
    }

    fn apply_damage(&mut self, entity: Entity, amount: f64) {
        if !self.store.is_alive(entity) {
            return;
        }
        let Ok(kind) = self.store.world().get::<&Ship>(entity).map(|s| s.kind) else {
            return;
        };
        match kind {
            EntityKind::Player => self.damage_player(entity, amount, true),
            EntityKind::Enemy => {
                if let Some((current, _)) = self.hurt(entity, amount) {
                    if current <= 0.0 {
                        self.kill_enemy(entity);
                    }
                }
            }
            EntityKind::Boss => {
                if let Some((current, max)) = self.hurt(entity, amount) {
                    if self.boss.observe(entity, current, max, self.events) == Some(BossPhase::Defeated) {
                        self.defeat_boss(entity);
                    }
                }
            }
        }
    }

    /// Subtract `amount`, clamped to `[0, max]`. Returns (current, max).
    fn hurt(&mut self, entity: Entity, amount: f64) -> Option<(f64, f64)> {
        let mut health = self.store.world().get::<&mut Health>(entity).ok()?;
        health.current = (health.current - amount).clamp(0.0, health.max);
        Some((health.current, health.max))
    }

    fn kill_enemy(&mut self, entity: Entity) {
        if !self.store.destroy(entity, RemovalCause::Destroyed) {
            return;
        }
        let world = self.store.world();
        let Ok((archetype, reward)) = world.get::<&Ship>(entity).map(|s| (s.archetype, s.reward)) else {
            return;
        };
        let position = world.get::<&Position>(entity).map(|p| *p).unwrap_or_default();
        let scale = world.get::<&Body>(entity).map(|b| b.scale).unwrap_or(1.0);
        let Some(spec) = archetype.and_then(|a| self.registry.enemy(a)) else {
            return;
        };

        self.events.push(GameEvent::EnemyDestroyed {
            entity: EntityStore::id(entity),
            archetype: spec.key.clone(),
            reward,
            position,
        });
        debug!(archetype = %spec.key, reward, "enemy destroyed");

        match spec.death {
            DeathBehavior::None => {}
            DeathBehavior::Split {
                child,
                scale: child_scale,
                offset,
            } => {
                for dx in [-offset, offset] {
                    let at = Position::new(position.x + dx, position.y);
                    if let Some(spawned) = world_setup::spawn_enemy(
                        self.store,
                        self.registry,
                        self.ctx,
                        &mut *self.rng,
                        child,
                        at,
                        scale * child_scale,
                    ) {
                        self.cooldowns.prime_loadout(self.store.world(), spawned, self.ctx.tick);
                    }
                }
            }
            DeathBehavior::Burst { ability } => {
                let Some(def) = self.registry.ability(ability) else {
                    return;
                };
                let aim = find_player(self.store.world())
                    .map(|(_, target)| position.direction_to(&target))
                    .unwrap_or_default();
                let count = spawn_pattern(
                    self.store,
                    self.ctx,
                    entity,
                    Faction::Hostile,
                    ability,
                    def,
                    position,
                    aim,
                    0,
                );
                self.events.push(GameEvent::AbilityFired {
                    owner: EntityStore::id(entity),
                    ability: def.key.clone(),
                    projectiles: count,
                });
            }
        }
    }

    fn defeat_boss(&mut self, entity: Entity) {
        if !self.store.destroy(entity, RemovalCause::Destroyed) {
            return;
        }
        let world = self.store.world();
        let reward = world.get::<&Ship>(entity).map(|s| s.reward).unwrap_or(0);
        let position = world.get::<&Position>(entity).map(|p| *p).unwrap_or_default();
        let key = self.boss.state().map(|s| s.key.clone()).unwrap_or_default();
        info!(boss = %key, reward, tick = self.ctx.tick, "boss defeated");
        self.events.push(GameEvent::BossDefeated {
            entity: EntityStore::id(entity),
            boss: key,
            reward,
            position,
        });
    }

    /// Damage the player. Invulnerability ignores the hit; an active shield
    /// absorbs first. `grants_iframes` is false for sustained sources.
    fn damage_player(&mut self, entity: Entity, amount: f64, grants_iframes: bool) {
        if amount <= 0.0 || !self.store.is_alive(entity) {
            return;
        }
        let world = self.store.world();
        if world.get::<&Pilot>(entity).is_ok_and(|p| p.invulnerable_ticks > 0) {
            return;
        }

        let mut remaining = amount;
        if let Ok(mut effects) = world.get::<&mut ActiveEffects>(entity) {
            if let Some(shield) = effects
                .effects
                .iter_mut()
                .find(|e| e.kind == PowerUpKind::Shield && e.remaining_ticks > 0)
            {
                let absorbed = remaining.min(shield.magnitude);
                shield.magnitude -= absorbed;
                remaining -= absorbed;
            }
            effects
                .effects
                .retain(|e| e.kind != PowerUpKind::Shield || e.magnitude > 0.0);
        }

        let Ok(mut health) = world.get::<&mut Health>(entity) else {
            return;
        };
        health.current = (health.current - remaining).clamp(0.0, health.max);
        let left = health.current;
        drop(health);

        if remaining > 0.0 && grants_iframes {
            if let Ok(mut pilot) = world.get::<&mut Pilot>(entity) {
                pilot.invulnerable_ticks = PLAYER_INVULNERABLE_TICKS;
            }
        }
        self.events.push(GameEvent::PlayerHit {
            damage: remaining,
            remaining_health: left,
            shielded: remaining <= 0.0,
        });

        if left <= 0.0 {
            let position = world.get::<&Position>(entity).map(|p| *p).unwrap_or_default();
            if self.store.destroy(entity, RemovalCause::Destroyed) {
                info!(tick = self.ctx.tick, "player destroyed");
                self.events.push(GameEvent::PlayerDestroyed { position });
            }
        }
    }

    fn player_contacts(&mut self) {
        let Some((player, at)) = find_player(self.store.world()) else {
            return;
        };
        let radius = self.store.world().get::<&Body>(player).map(|b| b.radius).unwrap_or(0.0);

        self.ship_contacts(player, at, radius);
        self.hazard_contacts(player, at, radius);
        self.power_up_contacts(player, at, radius);
    }

    fn ship_contacts(&mut self, player: Entity, at: Position, radius: f64) {
        for target in self.eligible_targets() {
            if !self.store.is_alive(player) {
                return;
            }
            if !Faction::Player.opposes(target.faction) || !self.store.is_alive(target.entity) {
                continue;
            }
            if at.distance_to(&target.position) >= radius + target.radius {
                continue;
            }
            let Ok((damage, dies)) = self
                .store
                .world()
                .get::<&Ship>(target.entity)
                .map(|s| (s.contact_damage, s.dies_on_contact))
            else {
                continue;
            };
            self.damage_player(player, damage, true);
            if dies && target.kind == EntityKind::Enemy {
                self.kill_enemy(target.entity);
            }
        }
    }

    fn hazard_contacts(&mut self, player: Entity, at: Position, radius: f64) {
        let now = self.ctx.tick;
        let mut touching: Vec<(u64, Entity, Hazard)> = self
            .store
            .world()
            .query::<(&Hazard, &Position, &SpawnInfo, &Lifecycle)>()
            .iter()
            .filter(|(_, (hazard, pos, info, life))| {
                life.alive && info.tick < now && at.distance_to(pos) < radius + hazard.radius
            })
            .map(|(entity, (hazard, _, info, _))| (info.seq, entity, *hazard))
            .collect();
        touching.sort_by_key(|(seq, ..)| *seq);

        for (_, entity, hazard) in touching {
            if !self.store.is_alive(player) {
                return;
            }
            match hazard.kind {
                HazardKind::Asteroid | HazardKind::Mine => {
                    self.damage_player(player, hazard.intensity, true);
                    self.store.destroy(entity, RemovalCause::Consumed);
                }
                HazardKind::Radiation => self.damage_player(player, hazard.intensity, false),
                // Pull is applied during movement.
                HazardKind::GravityWell => {}
            }
        }
    }

    fn power_up_contacts(&mut self, player: Entity, at: Position, radius: f64) {
        let now = self.ctx.tick;
        let mut touching: Vec<(u64, Entity, PowerUp)> = self
            .store
            .world()
            .query::<(&PowerUp, &Position, &SpawnInfo, &Lifecycle)>()
            .iter()
            .filter(|(_, (power_up, pos, info, life))| {
                life.alive && info.tick < now && at.distance_to(pos) < radius + power_up.radius
            })
            .map(|(entity, (power_up, _, info, _))| (info.seq, entity, *power_up))
            .collect();
        touching.sort_by_key(|(seq, ..)| *seq);

        for (_, entity, power_up) in touching {
            if !self.store.is_alive(player) {
                return;
            }
            if self.store.destroy(entity, RemovalCause::Collected) {
                apply_power_up(self.store, player, &power_up);
                self.events.push(GameEvent::PowerUpCollected {
                    kind: power_up.kind,
                    magnitude: power_up.magnitude,
                });
            }
        }
    }
}

/// Apply a collected power-up to the player. Timed kinds replace any running
/// effect of the same kind; score bonuses are counted from the event.
pub fn apply_power_up(store: &mut EntityStore, player: Entity, power_up: &PowerUp) {
    let world = store.world_mut();
    match power_up.kind {
        PowerUpKind::Repair => {
            if let Ok(mut health) = world.get::<&mut Health>(player) {
                health.current = (health.current + power_up.magnitude).clamp(0.0, health.max);
            }
        }
        PowerUpKind::Recharge => {
            if let Ok(mut energy) = world.get::<&mut Energy>(player) {
                energy.current = (energy.current + power_up.magnitude).clamp(0.0, energy.max);
            }
        }
        PowerUpKind::Upgrade => {
            if let Ok(mut loadout) = world.get::<&mut Loadout>(player) {
                let steps = power_up.magnitude.round().max(0.0) as u32;
                loadout.level = (loadout.level + steps).min(MAX_UPGRADE_LEVEL);
            }
        }
        PowerUpKind::ScoreBonus => {}
        PowerUpKind::RapidFire | PowerUpKind::SpreadShot | PowerUpKind::Shield => {
            if let Ok(mut effects) = world.get::<&mut ActiveEffects>(player) {
                effects.effects.retain(|e| e.kind != power_up.kind);
                effects.effects.push(ActiveEffect {
                    kind: power_up.kind,
                    magnitude: power_up.magnitude,
                    remaining_ticks: power_up.duration_ticks,
                });
            }
        }
    }
}

/// Run collision for one tick.
#[allow(clippy::too_many_arguments)]
pub fn run<R: Rng + ?Sized>(
    store: &mut EntityStore,
    registry: &ContentRegistry,
    ctx: &TickContext,
    rng: &mut R,
    cooldowns: &mut CooldownAbilityManager,
    boss: &mut BossPhaseController,
    events: &mut Vec<GameEvent>,
) {
    CollisionResolver {
        store,
        registry,
        ctx,
        rng,
        cooldowns,
        boss,
        events,
    }
    .resolve();
}
