//! Initial behavior state for freshly spawned ships.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;
use starfall_core::components::BehaviorState;
use starfall_core::constants::*;
use starfall_core::enums::BehaviorTag;
use starfall_core::types::{Position, Velocity};

/// Build the behavior state for a ship spawned at `spawn` with cruise `speed`.
///
/// Oscillating ships roll their phase offset and orbiting ships their start
/// angle from `rng`, so ships spawned on the same tick do not move in lockstep.
pub fn init_behavior<R: Rng + ?Sized>(
    tag: BehaviorTag,
    speed: f64,
    spawn: Position,
    rng: &mut R,
) -> BehaviorState {
    match tag {
        BehaviorTag::Player => BehaviorState::Player { speed },
        BehaviorTag::Straight => BehaviorState::Straight,
        BehaviorTag::Oscillating => BehaviorState::Oscillating {
            phase_offset: rng.gen_range(0.0..TAU),
            amplitude: OSCILLATION_AMPLITUDE,
            frequency: OSCILLATION_FREQUENCY,
            drift: speed,
            elapsed_ticks: 0,
        },
        BehaviorTag::Orbiting => {
            let angle = rng.gen_range(0.0..TAU);
            // Start on the orbit, with the center placed so the ship sits at its spawn point.
            let center = spawn.offset(-DVec2::from_angle(angle) * ORBIT_RADIUS);
            BehaviorState::Orbiting {
                center,
                radius: ORBIT_RADIUS,
                angle,
                angular_speed: ORBIT_ANGULAR_SPEED,
                drift: speed,
            }
        }
        BehaviorTag::Charge => BehaviorState::Charge {
            delay_ticks: CHARGE_DELAY_TICKS,
            elapsed_ticks: 0,
            burst_speed: speed * CHARGE_BURST_FACTOR,
            charged: false,
        },
        BehaviorTag::Homing => BehaviorState::Homing {
            speed,
            turn_rate: HOMING_TURN_RATE,
        },
        BehaviorTag::Teleport => BehaviorState::Teleport {
            interval_ticks: TELEPORT_INTERVAL_TICKS,
            timer: 0,
        },
        BehaviorTag::Cloaked => BehaviorState::Cloaked {
            interval_ticks: CLOAK_INTERVAL_TICKS,
            timer: 0,
            visible: true,
        },
        BehaviorTag::Kamikaze => BehaviorState::Kamikaze {
            acceleration: KAMIKAZE_ACCELERATION,
            max_speed: speed * KAMIKAZE_MAX_SPEED_FACTOR,
        },
    }
}

/// Velocity a ship enters the field with. Everything except the player and
/// orbiters drifts straight down at cruise speed.
pub fn initial_velocity(tag: BehaviorTag, speed: f64) -> Velocity {
    match tag {
        BehaviorTag::Player | BehaviorTag::Orbiting => Velocity::default(),
        BehaviorTag::Straight
        | BehaviorTag::Oscillating
        | BehaviorTag::Charge
        | BehaviorTag::Homing
        | BehaviorTag::Teleport
        | BehaviorTag::Cloaked
        | BehaviorTag::Kamikaze => Velocity::new(0.0, speed),
    }
}
