//! ECS components for hecs entities.
//!
//! Components are plain data structs. Game logic lives in systems and in the
//! behavior crate, not here.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{AbilityId, ArchetypeId, BossId, EntityId, Position};

/// Marks a combat ship (player, enemy or boss).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub kind: EntityKind,
    pub faction: Faction,
    /// Enemy archetype this ship was built from (None for player and boss).
    pub archetype: Option<ArchetypeId>,
    /// Damage dealt to the player on body contact.
    pub contact_damage: f64,
    /// Score awarded when destroyed by the player.
    pub reward: u64,
    /// Whether body contact with the player destroys this ship.
    pub dies_on_contact: bool,
}

/// Boss profile a boss ship was built from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossProfile {
    pub boss: BossId,
}

/// Hit points. `0 <= current <= max` always.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

/// Collision body. `radius` already includes `scale`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    pub radius: f64,
    pub scale: f64,
}

/// Per-entity behavior state: the behavior tag plus the timers it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BehaviorState {
    Player {
        speed: f64,
    },
    Straight,
    Oscillating {
        /// Per-entity phase offset (radians).
        phase_offset: f64,
        amplitude: f64,
        /// Angular frequency (radians per second).
        frequency: f64,
        /// Downward drift speed.
        drift: f64,
        elapsed_ticks: u64,
    },
    Orbiting {
        center: Position,
        radius: f64,
        angle: f64,
        /// Radians per second.
        angular_speed: f64,
        /// Downward drift of the orbit center.
        drift: f64,
    },
    Charge {
        delay_ticks: u32,
        elapsed_ticks: u32,
        burst_speed: f64,
        charged: bool,
    },
    Homing {
        speed: f64,
        /// Radians per second.
        turn_rate: f64,
    },
    Teleport {
        interval_ticks: u32,
        timer: u32,
    },
    Cloaked {
        interval_ticks: u32,
        timer: u32,
        visible: bool,
    },
    Kamikaze {
        acceleration: f64,
        max_speed: f64,
    },
}

impl BehaviorState {
    pub fn tag(&self) -> BehaviorTag {
        match self {
            BehaviorState::Player { .. } => BehaviorTag::Player,
            BehaviorState::Straight => BehaviorTag::Straight,
            BehaviorState::Oscillating { .. } => BehaviorTag::Oscillating,
            BehaviorState::Orbiting { .. } => BehaviorTag::Orbiting,
            BehaviorState::Charge { .. } => BehaviorTag::Charge,
            BehaviorState::Homing { .. } => BehaviorTag::Homing,
            BehaviorState::Teleport { .. } => BehaviorTag::Teleport,
            BehaviorState::Cloaked { .. } => BehaviorTag::Cloaked,
            BehaviorState::Kamikaze { .. } => BehaviorTag::Kamikaze,
        }
    }

    /// Whether collision and targeting may consider this entity.
    pub fn is_targetable(&self) -> bool {
        match self {
            BehaviorState::Cloaked { visible, .. } => *visible,
            _ => true,
        }
    }

    pub fn visual_hint(&self) -> VisualHint {
        match self {
            BehaviorState::Player { .. } => VisualHint::Piloted,
            BehaviorState::Straight => VisualHint::Steady,
            BehaviorState::Oscillating { .. } => VisualHint::Weaving,
            BehaviorState::Orbiting { .. } => VisualHint::Orbiting,
            BehaviorState::Charge { charged: false, .. } => VisualHint::WindingUp,
            BehaviorState::Charge { charged: true, .. } => VisualHint::Charging,
            BehaviorState::Homing { .. } => VisualHint::Seeking,
            BehaviorState::Teleport { .. } => VisualHint::Blinking,
            BehaviorState::Cloaked { visible: true, .. } => VisualHint::Steady,
            BehaviorState::Cloaked { visible: false, .. } => VisualHint::Cloaked,
            BehaviorState::Kamikaze { .. } => VisualHint::Ramming,
        }
    }
}

/// Abilities a ship can fire, in priority order, and its upgrade level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loadout {
    pub abilities: Vec<AbilityId>,
    /// Upgrade level, starting at 1. Intervals scale as `1 / level`.
    pub level: u32,
}

/// Finite energy pool consumed by firing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Energy {
    pub current: f64,
    pub max: f64,
    pub regen_per_tick: f64,
}

/// Player-only control state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pilot {
    /// Remaining post-hit invulnerability (ticks).
    pub invulnerable_ticks: u32,
}

/// Timed power-up effects currently applied to the player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub effects: Vec<ActiveEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub magnitude: f64,
    pub remaining_ticks: u32,
}

impl ActiveEffects {
    /// Strongest active magnitude of a kind, if any.
    pub fn magnitude(&self, kind: PowerUpKind) -> Option<f64> {
        self.effects
            .iter()
            .filter(|e| e.kind == kind && e.remaining_ticks > 0)
            .map(|e| e.magnitude)
            .reduce(f64::max)
    }
}

/// Projectile behavior flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectileFlags {
    pub pierce: bool,
    pub homing: bool,
    pub explosive: bool,
}

/// Chain-on-proximity parameters carried by a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainSpec {
    pub jumps: u32,
    pub range: f64,
    /// Damage multiplier applied per jump.
    pub falloff: f64,
}

/// A live projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: EntityId,
    pub faction: Faction,
    pub ability: AbilityId,
    pub damage: f64,
    pub flags: ProjectileFlags,
    /// Ticks remaining before expiry.
    pub ttl: u32,
    pub radius: f64,
    /// Area damage radius for explosive projectiles.
    pub explosion_radius: f64,
    pub chain: Option<ChainSpec>,
    /// Radians per second for homing projectiles.
    pub turn_rate: f64,
    /// Targets struck during the current tick (pierce bookkeeping).
    pub struck: Vec<EntityId>,
}

/// A power-up lying on the field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub magnitude: f64,
    /// Effect duration once collected; 0 = instantaneous.
    pub duration_ticks: u32,
    /// Ticks until the uncollected power-up disappears.
    pub lifetime_ticks: u32,
    pub radius: f64,
}

/// An environmental hazard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    pub radius: f64,
    pub intensity: f64,
    pub ttl: u32,
}

/// Alive flag shared by every entity. Flips to dead exactly once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lifecycle {
    pub alive: bool,
    pub cause: Option<RemovalCause>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            alive: true,
            cause: None,
        }
    }
}

/// Creation stamp: `seq` orders entities by creation, `tick` gates collision
/// eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnInfo {
    pub seq: u64,
    pub tick: u64,
}
