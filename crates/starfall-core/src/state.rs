//! World snapshot: the complete visible state handed to collaborators after
//! each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{EntityId, Position, SimTime, Velocity};

/// Read-only view of the world after a completed tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub paused: bool,
    pub level: u32,
    pub ships: Vec<ShipView>,
    pub projectiles: Vec<ProjectileView>,
    pub power_ups: Vec<PowerUpView>,
    pub hazards: Vec<HazardView>,
    pub boss: Option<BossView>,
    pub score: ScoreView,
    pub events: Vec<GameEvent>,
    pub achievements_unlocked: Vec<String>,
}

/// A live ship (player, enemy or boss).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipView {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Archetype or boss profile key; "player" for the player.
    pub archetype: String,
    pub position: Position,
    pub velocity: Velocity,
    pub health: f64,
    pub max_health: f64,
    pub radius: f64,
    pub behavior: BehaviorTag,
    pub hint: VisualHint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub owner: EntityId,
    pub faction: Faction,
    pub position: Position,
    pub velocity: Velocity,
    pub radius: f64,
    pub pierce: bool,
    pub homing: bool,
    pub explosive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpView {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub position: Position,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardView {
    pub id: EntityId,
    pub kind: HazardKind,
    pub position: Position,
    pub radius: f64,
    pub ttl: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossView {
    pub id: EntityId,
    pub boss: String,
    pub phase: u32,
    pub max_phases: u32,
    pub health: f64,
    pub max_health: f64,
    pub attack_cooldown_ticks: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub score: u64,
    pub kills: u32,
    pub bosses_defeated: u32,
    pub player_health: f64,
    pub player_energy: f64,
    pub upgrade_level: u32,
    pub survival_secs: f64,
}
