//! Raw content tables: abilities, enemy archetypes, bosses, power-ups,
//! hazards, level profiles and achievements.
//!
//! These are the serde-facing definitions. Cross-references are by string key
//! and behaviors are named by string; nothing here is trusted until it has
//! gone through [`crate::registry::ContentRegistry::validate`].

use serde::{Deserialize, Serialize};

use crate::enums::{AttackSelection, HazardKind, PowerUpKind};
use crate::error::ConfigError;

/// Complete set of content tables for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDef {
    pub player: PlayerDef,
    pub abilities: Vec<AbilityDef>,
    pub enemies: Vec<EnemyDef>,
    #[serde(default)]
    pub bosses: Vec<BossDef>,
    #[serde(default)]
    pub power_ups: Vec<PowerUpDef>,
    #[serde(default)]
    pub hazards: Vec<HazardDef>,
    pub levels: Vec<LevelDef>,
    #[serde(default)]
    pub achievements: Vec<AchievementDef>,
}

impl ContentDef {
    /// Parse content tables from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDef {
    pub health: f64,
    pub radius: f64,
    pub speed: f64,
    /// Energy pool size; 0 disables the energy requirement.
    #[serde(default)]
    pub energy: f64,
    #[serde(default)]
    pub energy_regen_per_tick: f64,
    /// Primary first, then secondary.
    pub abilities: Vec<String>,
}

/// Projectile archetype produced by an ability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityPattern {
    Single,
    /// `count` projectiles fanned evenly across `arc_degrees`.
    Spread { count: u32, arc_degrees: f64 },
    Piercing,
    /// Turn rate in radians per second.
    Homing { turn_rate: f64 },
    /// Area damage of the full projectile damage within `radius` on impact.
    Explosive { radius: f64 },
    /// On impact, jumps to the nearest opposing ship within `range`.
    Chain { jumps: u32, range: f64, falloff: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityDef {
    pub key: String,
    pub pattern: AbilityPattern,
    pub damage: f64,
    /// Projectile speed (units/s).
    pub speed: f64,
    /// Base cooldown at upgrade level 1 (ticks).
    pub interval_ticks: u64,
    #[serde(default)]
    pub energy_cost: f64,
    pub ttl_ticks: u32,
    pub radius: f64,
}

/// What happens when an enemy dies, beyond the destroyed event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeathDef {
    #[default]
    None,
    /// Two children of archetype `child` at `scale` of the parent, offset
    /// left and right by `offset`.
    Split {
        child: String,
        scale: f64,
        offset: f64,
    },
    /// Fires `ability` from the death position at the player.
    Burst { ability: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDef {
    pub key: String,
    pub behavior: String,
    pub health: f64,
    pub radius: f64,
    pub speed: f64,
    pub reward: u64,
    #[serde(default)]
    pub contact_damage: f64,
    #[serde(default)]
    pub dies_on_contact: bool,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub death: DeathDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscortDef {
    pub archetype: String,
    pub count: u32,
    pub interval_ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossDef {
    pub key: String,
    pub behavior: String,
    pub health: f64,
    pub radius: f64,
    pub speed: f64,
    pub reward: u64,
    #[serde(default)]
    pub contact_damage: f64,
    pub phases: u32,
    pub attack_pool: Vec<String>,
    pub attack_cooldown_ticks: u64,
    /// Multiplier applied to the attack cooldown on each phase advance.
    pub phase_cooldown_factor: f64,
    #[serde(default)]
    pub selection: AttackSelection,
    #[serde(default)]
    pub escort: Option<EscortDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpDef {
    pub key: String,
    pub kind: PowerUpKind,
    pub magnitude: f64,
    #[serde(default)]
    pub duration_ticks: u32,
    pub lifetime_ticks: u32,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardDef {
    pub key: String,
    pub kind: HazardKind,
    pub radius: f64,
    pub intensity: f64,
    pub ttl_ticks: u32,
    /// Drift speed (units/s); 0 for stationary hazards.
    #[serde(default)]
    pub speed: f64,
}

/// Base interval plus symmetric jitter, both in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDef {
    pub base_interval_ticks: u64,
    #[serde(default)]
    pub jitter_ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedDef {
    pub key: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDef {
    pub key: String,
    pub enemy_waves: Option<ScheduleDef>,
    pub wave_min: u32,
    pub wave_max: u32,
    #[serde(default)]
    pub enemies: Vec<WeightedDef>,
    #[serde(default)]
    pub power_up_schedule: Option<ScheduleDef>,
    #[serde(default)]
    pub power_ups: Vec<WeightedDef>,
    #[serde(default)]
    pub hazard_schedule: Option<ScheduleDef>,
    #[serde(default)]
    pub hazards: Vec<WeightedDef>,
    #[serde(default)]
    pub boss: Option<String>,
    /// Level-relative tick at which the boss arrives.
    #[serde(default)]
    pub boss_at_tick: u64,
}

/// Threshold predicate over run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AchievementPredicate {
    Kills { count: u32 },
    Score { points: u64 },
    SurvivalSecs { secs: u64 },
    BossesDefeated { count: u32 },
    PowerUpsCollected { count: u32 },
    ShotsFired { count: u32 },
    /// No damage taken in the current level, once it has run `ticks`.
    Flawless { ticks: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub predicate: AchievementPredicate,
}
