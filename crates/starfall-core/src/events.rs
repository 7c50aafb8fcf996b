//! Typed events emitted by the simulation for audio, particles and analytics.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityId, Position};

/// Everything observable that happened during one tick, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// An enemy was destroyed by the player.
    EnemyDestroyed {
        entity: EntityId,
        archetype: String,
        reward: u64,
        position: Position,
    },
    /// The player took damage.
    PlayerHit {
        damage: f64,
        remaining_health: f64,
        /// Shield absorbed the hit entirely.
        shielded: bool,
    },
    /// The player's health reached zero.
    PlayerDestroyed { position: Position },
    /// An ability fired successfully.
    AbilityFired {
        owner: EntityId,
        ability: String,
        projectiles: u32,
    },
    /// The player picked up a power-up.
    PowerUpCollected { kind: PowerUpKind, magnitude: f64 },
    /// A boss arrived on the field.
    BossArrived { entity: EntityId, boss: String },
    /// A boss advanced to a new phase (announced once per phase value).
    BossPhaseChanged {
        entity: EntityId,
        boss: String,
        phase: u32,
    },
    /// A boss was defeated.
    BossDefeated {
        entity: EntityId,
        boss: String,
        reward: u64,
        position: Position,
    },
    /// A new level began.
    LevelStarted { level: u32, profile: String },
    /// An achievement predicate became satisfied.
    AchievementUnlocked { id: String },
}
