//! Run statistics and achievement evaluation.
//!
//! The tracker only reads the tick's event stream; it never touches
//! entities. `evaluate` is a pure function of the stats.

use serde::{Deserialize, Serialize};
use tracing::info;

use starfall_core::constants::TICK_RATE;
use starfall_core::content::{AchievementDef, AchievementPredicate};
use starfall_core::enums::PowerUpKind;
use starfall_core::events::GameEvent;
use starfall_core::types::EntityId;

/// Cumulative statistics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub kills: u32,
    pub score: u64,
    pub survival_ticks: u64,
    pub bosses_defeated: u32,
    pub power_ups_collected: u32,
    pub shots_fired: u32,
    /// Ticks played in the current level.
    pub level_ticks: u64,
    /// Whether the player has taken damage in the current level.
    pub damaged_this_level: bool,
}

/// Whether `predicate` holds for `stats`.
pub fn satisfied(predicate: &AchievementPredicate, stats: &RunStats) -> bool {
    match *predicate {
        AchievementPredicate::Kills { count } => stats.kills >= count,
        AchievementPredicate::Score { points } => stats.score >= points,
        AchievementPredicate::SurvivalSecs { secs } => stats.survival_ticks >= secs * u64::from(TICK_RATE),
        AchievementPredicate::BossesDefeated { count } => stats.bosses_defeated >= count,
        AchievementPredicate::PowerUpsCollected { count } => stats.power_ups_collected >= count,
        AchievementPredicate::ShotsFired { count } => stats.shots_fired >= count,
        AchievementPredicate::Flawless { ticks } => {
            !stats.damaged_this_level && stats.level_ticks >= ticks
        }
    }
}

/// Ids of achievements satisfied by `stats` that are not yet in `unlocked`,
/// in definition order.
pub fn evaluate(stats: &RunStats, defs: &[AchievementDef], unlocked: &[String]) -> Vec<String> {
    defs.iter()
        .filter(|def| !unlocked.contains(&def.id) && satisfied(&def.predicate, stats))
        .map(|def| def.id.clone())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct StatTracker {
    stats: RunStats,
    unlocked: Vec<String>,
}

impl StatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn unlocked(&self) -> &[String] {
        &self.unlocked
    }

    /// Fold one tick's events into the stats and count the tick.
    pub fn observe(&mut self, events: &[GameEvent], player: Option<EntityId>) {
        for event in events {
            match event {
                GameEvent::EnemyDestroyed { reward, .. } => {
                    self.stats.kills += 1;
                    self.stats.score += reward;
                }
                GameEvent::BossDefeated { reward, .. } => {
                    self.stats.bosses_defeated += 1;
                    self.stats.score += reward;
                }
                GameEvent::PowerUpCollected { kind, magnitude } => {
                    self.stats.power_ups_collected += 1;
                    if *kind == PowerUpKind::ScoreBonus {
                        self.stats.score += magnitude.round().max(0.0) as u64;
                    }
                }
                GameEvent::AbilityFired { owner, .. } if Some(*owner) == player => {
                    self.stats.shots_fired += 1;
                }
                GameEvent::PlayerHit { damage, .. } if *damage > 0.0 => {
                    self.stats.damaged_this_level = true;
                }
                _ => {}
            }
        }
        self.stats.survival_ticks += 1;
        self.stats.level_ticks += 1;
    }

    /// Level boundary: window-scoped counters start over. Nothing else
    /// resets them.
    pub fn reset_window(&mut self) {
        self.stats.level_ticks = 0;
        self.stats.damaged_this_level = false;
    }

    /// Observe the tick, then append `AchievementUnlocked` for every newly
    /// satisfied achievement. Returns the new ids.
    pub fn run(
        &mut self,
        defs: &[AchievementDef],
        player: Option<EntityId>,
        events: &mut Vec<GameEvent>,
    ) -> Vec<String> {
        self.observe(events, player);
        let fresh = evaluate(&self.stats, defs, &self.unlocked);
        for id in &fresh {
            info!(achievement = %id, "achievement unlocked");
            events.push(GameEvent::AchievementUnlocked { id: id.clone() });
        }
        self.unlocked.extend(fresh.iter().cloned());
        fresh
    }

    pub fn clear(&mut self) {
        self.stats = RunStats::default();
        self.unlocked.clear();
    }
}
