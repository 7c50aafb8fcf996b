//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D position in playfield space (units, origin top-left, +y down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// 2D velocity in playfield units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

/// Stable outward-facing entity identifier (index + generation packed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Index into the validated ability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId(pub u16);

/// Index into the validated enemy archetype table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArchetypeId(pub u16);

/// Index into the validated boss profile table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BossId(pub u16);

/// Index into the validated power-up table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PowerUpId(pub u16);

/// Index into the validated hazard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HazardId(pub u16);

/// Rectangular play area. Everything that matters happens inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f64,
    pub height: f64,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: crate::constants::PLAYFIELD_WIDTH,
            height: crate::constants::PLAYFIELD_HEIGHT,
        }
    }
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn vec(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.vec().distance(other.vec())
    }

    /// Unit vector pointing at `other`, or zero when the points coincide.
    pub fn direction_to(&self, other: &Position) -> DVec2 {
        (other.vec() - self.vec()).normalize_or_zero()
    }

    /// Offset by a displacement vector.
    pub fn offset(&self, delta: DVec2) -> Position {
        Position::from(self.vec() + delta)
    }
}

impl From<DVec2> for Position {
    fn from(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn vec(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Speed magnitude (units/s).
    pub fn speed(&self) -> f64 {
        self.vec().length()
    }
}

impl From<DVec2> for Velocity {
    fn from(v: DVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}

impl Playfield {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp a point so a body of `half_extent` stays fully inside the field.
    pub fn clamp_inside(&self, pos: Position, half_extent: f64) -> Position {
        let max_x = (self.width - half_extent).max(half_extent);
        let max_y = (self.height - half_extent).max(half_extent);
        Position::new(
            pos.x.clamp(half_extent, max_x),
            pos.y.clamp(half_extent, max_y),
        )
    }

    /// Inclusive horizontal spawn range for a body of `half_extent`.
    pub fn x_range(&self, half_extent: f64) -> (f64, f64) {
        let lo = half_extent.min(self.width / 2.0);
        (lo, (self.width - half_extent).max(lo))
    }

    /// Inclusive vertical spawn range for a body of `half_extent`.
    pub fn y_range(&self, half_extent: f64) -> (f64, f64) {
        let lo = half_extent.min(self.height / 2.0);
        (lo, (self.height - half_extent).max(lo))
    }

    /// Whether a point lies inside the field grown by `margin` on every side.
    pub fn contains(&self, pos: &Position, margin: f64) -> bool {
        pos.x >= -margin
            && pos.y >= -margin
            && pos.x <= self.width + margin
            && pos.y <= self.height + margin
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }
}
