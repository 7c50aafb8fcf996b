//! Enumeration types used throughout the simulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a ship is, for targeting, scoring and snapshot purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Boss,
}

/// Side an entity fights for. Same-faction pairs never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Hostile,
}

impl Faction {
    pub fn opposes(self, other: Faction) -> bool {
        self != other
    }
}

/// Per-tick movement/targeting rule selector.
///
/// Content tables name behaviors by string; they are parsed into this enum
/// once, during content validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorTag {
    /// Driven by player input.
    Player,
    Straight,
    Oscillating,
    Orbiting,
    Charge,
    Homing,
    Teleport,
    Cloaked,
    Kamikaze,
}

impl BehaviorTag {
    pub const ALL: [BehaviorTag; 9] = [
        BehaviorTag::Player,
        BehaviorTag::Straight,
        BehaviorTag::Oscillating,
        BehaviorTag::Orbiting,
        BehaviorTag::Charge,
        BehaviorTag::Homing,
        BehaviorTag::Teleport,
        BehaviorTag::Cloaked,
        BehaviorTag::Kamikaze,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorTag::Player => "player",
            BehaviorTag::Straight => "straight",
            BehaviorTag::Oscillating => "oscillating",
            BehaviorTag::Orbiting => "orbiting",
            BehaviorTag::Charge => "charge",
            BehaviorTag::Homing => "homing",
            BehaviorTag::Teleport => "teleport",
            BehaviorTag::Cloaked => "cloaked",
            BehaviorTag::Kamikaze => "kamikaze",
        }
    }
}

impl fmt::Display for BehaviorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a behavior name is not one of the known tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl FromStr for BehaviorTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        BehaviorTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == normalized)
            .or(match normalized.as_str() {
                "zigzag" | "sine" => Some(BehaviorTag::Oscillating),
                "orbit" => Some(BehaviorTag::Orbiting),
                _ => None,
            })
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

/// Power-up effect type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    /// Instant: restore `magnitude` health.
    Repair,
    /// Instant: restore `magnitude` energy.
    Recharge,
    /// Instant: raise the upgrade level by `magnitude` (rounded).
    Upgrade,
    /// Instant: add `magnitude` to the score.
    ScoreBonus,
    /// Timed: divide ability intervals by `magnitude`.
    RapidFire,
    /// Timed: add `magnitude` (rounded) extra pellets to player shots.
    SpreadShot,
    /// Timed: absorb up to `magnitude` damage.
    Shield,
}

impl PowerUpKind {
    /// Whether the effect persists for a duration rather than applying once.
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            PowerUpKind::RapidFire | PowerUpKind::SpreadShot | PowerUpKind::Shield
        )
    }
}

/// Environmental hazard type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    /// Drifts; contact deals `intensity` and shatters it.
    Asteroid,
    /// Stationary; detonates once on contact for `intensity`.
    Mine,
    /// Stationary zone; deals `intensity` every tick of overlap.
    Radiation,
    /// Pulls the player toward its center with strength `intensity`.
    GravityWell,
}

/// How a boss picks its next attack from the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackSelection {
    #[default]
    Sequential,
    Random,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Idle,
    Active,
    GameOver,
}

/// Why an entity left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Health reached zero.
    Destroyed,
    /// Projectile spent on impact.
    Consumed,
    /// Ttl/lifetime counter reached zero.
    Expired,
    /// Left the playfield.
    OutOfBounds,
    /// Picked up by the player.
    Collected,
}

/// Rendering hint derived from behavior state. The core never draws anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualHint {
    #[default]
    Steady,
    Piloted,
    Weaving,
    Orbiting,
    WindingUp,
    Charging,
    Seeking,
    Blinking,
    Cloaked,
    Ramming,
}
