//! Boss phase controller.
//!
//! Maps boss health to a phase, announces each newly reached phase once,
//! tightens the attack cadence per phase, and picks attacks from the boss's
//! pool. Boss state is kept here, not as ECS components, like the cooldown
//! table.

use glam::DVec2;
use hecs::Entity;
use rand::Rng;
use tracing::debug;

use starfall_core::constants::BOSS_MIN_ATTACK_COOLDOWN_TICKS;
use starfall_core::enums::AttackSelection;
use starfall_core::events::GameEvent;
use starfall_core::registry::{BossSpec, ContentRegistry};
use starfall_core::types::{AbilityId, BossId, Position};

use crate::context::TickContext;
use crate::store::EntityStore;
use crate::systems::abilities::CooldownAbilityManager;

/// Result of mapping health to a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    Phase(u32),
    Defeated,
}

/// `phase = clamp(ceil((1 - health / max) * phases) + 1, 1, phases)`, or
/// `Defeated` once health is gone.
pub fn phase_for(health: f64, max_health: f64, phases: u32) -> BossPhase {
    if health <= 0.0 {
        return BossPhase::Defeated;
    }
    let phases = phases.max(1);
    let lost = if max_health > 0.0 {
        (1.0 - health / max_health).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let raw = (lost * f64::from(phases)).ceil() as u32 + 1;
    BossPhase::Phase(raw.clamp(1, phases))
}

/// Live state of the current boss encounter.
#[derive(Debug, Clone)]
pub struct BossState {
    pub entity: Entity,
    pub boss: BossId,
    pub key: String,
    pub phase: u32,
    pub max_phases: u32,
    pub attack_pool: Vec<AbilityId>,
    pub selection: AttackSelection,
    /// Current ticks between attacks.
    pub attack_cooldown: u64,
    pub phase_cooldown_factor: f64,
    pub last_attack_tick: u64,
    /// Index of the next attack for sequential selection.
    pub next_attack: usize,
    pub defeated: bool,
}

#[derive(Debug, Default)]
pub struct BossPhaseController {
    state: Option<BossState>,
}

impl BossPhaseController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an encounter. The first attack comes one full cooldown after
    /// arrival.
    pub fn begin(&mut self, entity: Entity, boss: BossId, spec: &BossSpec, now: u64) {
        self.state = Some(BossState {
            entity,
            boss,
            key: spec.key.clone(),
            phase: 1,
            max_phases: spec.phases,
            attack_pool: spec.attack_pool.clone(),
            selection: spec.selection,
            attack_cooldown: spec.attack_cooldown_ticks,
            phase_cooldown_factor: spec.phase_cooldown_factor,
            last_attack_tick: now,
            next_attack: 0,
            defeated: false,
        });
    }

    pub fn state(&self) -> Option<&BossState> {
        self.state.as_ref()
    }

    /// A boss is on the field and not yet defeated.
    pub fn is_engaged(&self) -> bool {
        self.state.as_ref().is_some_and(|s| !s.defeated)
    }

    pub fn entity(&self) -> Option<Entity> {
        self.state.as_ref().map(|s| s.entity)
    }

    /// Re-evaluate the phase after a health change of `entity`.
    ///
    /// Phases only ever advance. Each newly reached phase value is announced
    /// once and multiplies the attack cooldown by the phase factor. Returns
    /// `None` when `entity` is not the engaged boss.
    pub fn observe(
        &mut self,
        entity: Entity,
        health: f64,
        max_health: f64,
        events: &mut Vec<GameEvent>,
    ) -> Option<BossPhase> {
        let state = self.state.as_mut().filter(|s| s.entity == entity && !s.defeated)?;
        match phase_for(health, max_health, state.max_phases) {
            BossPhase::Defeated => {
                state.defeated = true;
                Some(BossPhase::Defeated)
            }
            BossPhase::Phase(reached) => {
                while state.phase < reached {
                    state.phase += 1;
                    let scaled = (state.attack_cooldown as f64 * state.phase_cooldown_factor).round() as u64;
                    state.attack_cooldown = scaled.max(BOSS_MIN_ATTACK_COOLDOWN_TICKS);
                    events.push(GameEvent::BossPhaseChanged {
                        entity: EntityStore::id(entity),
                        boss: state.key.clone(),
                        phase: state.phase,
                    });
                    debug!(boss = %state.key, phase = state.phase, cooldown = state.attack_cooldown, "boss phase advanced");
                }
                Some(BossPhase::Phase(state.phase))
            }
        }
    }

    /// Fire the next attack if the cadence allows. A failed fire (the
    /// ability's own cooldown) leaves the cadence and rotation untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn attack<R: Rng + ?Sized>(
        &mut self,
        manager: &mut CooldownAbilityManager,
        store: &mut EntityStore,
        registry: &ContentRegistry,
        ctx: &TickContext,
        rng: &mut R,
        target: Option<Position>,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.defeated
            || state.attack_pool.is_empty()
            || ctx.tick.saturating_sub(state.last_attack_tick) < state.attack_cooldown
        {
            return;
        }
        let Ok(origin) = store.world().get::<&Position>(state.entity).map(|p| *p) else {
            return;
        };
        let aim = target
            .map(|t| origin.direction_to(&t))
            .filter(|dir| *dir != DVec2::ZERO)
            .unwrap_or(DVec2::Y);
        let index = match state.selection {
            AttackSelection::Sequential => state.next_attack % state.attack_pool.len(),
            AttackSelection::Random => rng.gen_range(0..state.attack_pool.len()),
        };
        let ability = state.attack_pool[index];
        if manager.try_fire(store, registry, ctx, state.entity, ability, origin, aim, events) {
            state.last_attack_tick = ctx.tick;
            state.next_attack += 1;
        }
    }

    /// Hand over the finished encounter once the boss has been defeated.
    pub fn take_defeated(&mut self) -> Option<BossState> {
        if self.state.as_ref().is_some_and(|s| s.defeated) {
            self.state.take()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.state = None;
    }
}
