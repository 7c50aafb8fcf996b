//! Spawn director: timed schedules for enemy waves, power-ups and hazards.
//!
//! Each schedule fires at `base + uniform(-jitter, +jitter)` ticks after its
//! previous firing. Nothing is spawned directly; due spawns are pushed into
//! the event queue so staggered wave members come out one by one.

use rand::Rng;
use tracing::debug;

use starfall_core::constants::{WAVE_SPACING, WAVE_STAGGER_TICKS};
use starfall_core::content::ScheduleDef;
use starfall_core::registry::{ContentRegistry, EscortSpec, LevelSpec};
use starfall_core::types::{ArchetypeId, Position};

use crate::context::TickContext;
use crate::event_queue::{EventQueue, ScheduledAction};

/// Next interval for a schedule. Validation guarantees `jitter < base`.
pub fn roll_interval<R: Rng + ?Sized>(schedule: &ScheduleDef, rng: &mut R) -> u64 {
    let base = schedule.base_interval_ticks as i64;
    let jitter = schedule.jitter_ticks as i64;
    let offset = if jitter > 0 {
        rng.gen_range(-jitter..=jitter)
    } else {
        0
    };
    (base + offset).max(1) as u64
}

#[derive(Debug, Clone, Default)]
pub struct SpawnDirector {
    next_wave: Option<u64>,
    next_power_up: Option<u64>,
    next_hazard: Option<u64>,
    /// Escort schedule and the tick its next member is due.
    escort: Option<(EscortSpec, u64)>,
    /// Ordinary waves are held while a boss is on the field.
    suspended: bool,
}

impl SpawnDirector {
    /// Arm every schedule the level defines, counting from `now`.
    pub fn for_level<R: Rng + ?Sized>(level: &LevelSpec, now: u64, rng: &mut R) -> Self {
        let mut arm = |schedule: Option<ScheduleDef>| schedule.map(|s| now + roll_interval(&s, rng));
        Self {
            next_wave: arm(level.enemy_waves),
            next_power_up: arm(level.power_up_schedule),
            next_hazard: arm(level.hazard_schedule),
            escort: None,
            suspended: false,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn next_wave(&self) -> Option<u64> {
        self.next_wave
    }

    /// Hold ordinary waves for a boss encounter, switching to the boss's
    /// escort schedule if it has one.
    pub fn begin_boss(&mut self, escort: Option<EscortSpec>, now: u64) {
        self.suspended = true;
        self.escort = escort
            .filter(|e| e.count > 0)
            .map(|e| (e, now + e.interval_ticks.max(1)));
    }

    /// Resume ordinary waves after the boss falls.
    pub fn end_boss<R: Rng + ?Sized>(&mut self, level: &LevelSpec, now: u64, rng: &mut R) {
        self.suspended = false;
        self.escort = None;
        self.next_wave = level.enemy_waves.map(|s| now + roll_interval(&s, rng));
    }

    /// Queue everything due this tick.
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        ctx: &TickContext,
        registry: &ContentRegistry,
        level: &LevelSpec,
        rng: &mut R,
        queue: &mut EventQueue,
    ) {
        let now = ctx.tick;

        if self.suspended {
            if let Some((escort, due)) = self.escort {
                if now >= due {
                    let members = vec![escort.archetype; escort.count as usize];
                    schedule_formation(ctx, registry, rng, queue, &members, true);
                    self.escort = Some((escort, now + escort.interval_ticks.max(1)));
                }
            }
        } else if let (Some(due), Some(schedule)) = (self.next_wave, level.enemy_waves) {
            if now >= due {
                self.next_wave = Some(now + roll_interval(&schedule, rng));
                if !level.enemies.is_empty() {
                    let count = rng.gen_range(level.wave_min..=level.wave_max.max(level.wave_min));
                    let members: Vec<_> = (0..count)
                        .filter_map(|_| level.enemies.pick(rng.gen_range(0..level.enemies.total_weight())))
                        .collect();
                    debug!(tick = now, members = members.len(), "wave scheduled");
                    schedule_formation(ctx, registry, rng, queue, &members, false);
                }
            }
        }

        if let (Some(due), Some(schedule)) = (self.next_power_up, level.power_up_schedule) {
            if now >= due {
                self.next_power_up = Some(now + roll_interval(&schedule, rng));
                if !level.power_ups.is_empty() {
                    let roll = rng.gen_range(0..level.power_ups.total_weight());
                    if let Some(power_up) = level.power_ups.pick(roll) {
                        queue.schedule(now, ScheduledAction::SpawnPowerUp { power_up });
                    }
                }
            }
        }

        if let (Some(due), Some(schedule)) = (self.next_hazard, level.hazard_schedule) {
            if now >= due {
                self.next_hazard = Some(now + roll_interval(&schedule, rng));
                if !level.hazards.is_empty() {
                    let roll = rng.gen_range(0..level.hazards.total_weight());
                    if let Some(hazard) = level.hazards.pick(roll) {
                        queue.schedule(now, ScheduledAction::SpawnHazard { hazard });
                    }
                }
            }
        }
    }
}

/// Lay `members` out in a row across the top edge around a random center and
/// queue them one stagger apart.
fn schedule_formation<R: Rng + ?Sized>(
    ctx: &TickContext,
    registry: &ContentRegistry,
    rng: &mut R,
    queue: &mut EventQueue,
    members: &[ArchetypeId],
    escort: bool,
) {
    if members.is_empty() {
        return;
    }
    let widest = members
        .iter()
        .filter_map(|&a| registry.enemy(a))
        .fold(0.0_f64, |acc, spec| acc.max(spec.radius));
    let (x_lo, x_hi) = ctx.playfield.x_range(widest);
    let center = rng.gen_range(x_lo..=x_hi);
    let first = center - WAVE_SPACING * (members.len() as f64 - 1.0) / 2.0;

    for (i, &archetype) in members.iter().enumerate() {
        let radius = registry.enemy(archetype).map(|s| s.radius).unwrap_or(widest);
        let (lo, hi) = ctx.playfield.x_range(radius);
        let x = (first + WAVE_SPACING * i as f64).clamp(lo, hi);
        queue.schedule(
            ctx.tick + i as u64 * WAVE_STAGGER_TICKS,
            ScheduledAction::SpawnEnemy {
                archetype,
                position: Position::new(x, radius),
                escort,
            },
        );
    }
}
