//! Inputs sent from collaborators to the simulation.
//!
//! Commands are queued and applied at the next tick boundary. `PlayerInput`
//! is sampled once per tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::types::Position;

/// Run-level control actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Start a run from the given level (1-based).
    StartRun { level: u32 },
    /// Throw away the current run and return to idle.
    Restart,
    /// Set the global pause flag.
    Pause,
    /// Clear the global pause flag.
    Resume,
    /// Flip the global pause flag.
    TogglePause,
}

/// Per-tick player intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Desired movement direction; normalised by the dispatcher.
    pub move_x: f64,
    pub move_y: f64,
    /// Fire the primary ability.
    pub fire: bool,
    /// Fire the secondary ability.
    pub secondary: bool,
    /// Aim point; straight up when absent.
    pub aim: Option<Position>,
}

impl PlayerInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn movement(&self) -> DVec2 {
        DVec2::new(self.move_x, self.move_y)
    }
}
