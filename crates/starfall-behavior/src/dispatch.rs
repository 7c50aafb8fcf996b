//! Per-tick behavior dispatch.
//!
//! Pure functions over plain data: each step sees only the entity's own state
//! plus the read-only position of the nearest opponent. No ECS dependency.

use glam::DVec2;
use rand::Rng;
use starfall_core::components::BehaviorState;
use starfall_core::types::{Playfield, Position, Velocity};

/// Input to the dispatcher for a single entity.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorContext {
    pub position: Position,
    pub velocity: Velocity,
    pub dt: f64,
    pub playfield: Playfield,
    /// Collision radius, used to keep clamped and teleported ships inside.
    pub radius: f64,
    /// Nearest targetable opposing ship, if any.
    pub nearest_opponent: Option<Position>,
    /// Player movement intent. Only read by the player behavior.
    pub input: Option<DVec2>,
}

/// Output from the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionUpdate {
    pub position: Position,
    pub velocity: Velocity,
}

/// Advance one entity by one tick. Timers inside `state` are updated in place.
pub fn step<R: Rng + ?Sized>(
    state: &mut BehaviorState,
    ctx: &BehaviorContext,
    rng: &mut R,
) -> MotionUpdate {
    match state {
        BehaviorState::Player { speed } => step_player(*speed, ctx),
        BehaviorState::Straight => integrate(ctx.position, ctx.velocity.vec(), ctx.dt),
        BehaviorState::Oscillating {
            phase_offset,
            amplitude,
            frequency,
            drift,
            elapsed_ticks,
        } => {
            *elapsed_ticks += 1;
            let t = *elapsed_ticks as f64 * ctx.dt;
            // d/dt of A·sin(ωt + φ)
            let vx = *amplitude * *frequency * (*frequency * t + *phase_offset).cos();
            integrate(ctx.position, DVec2::new(vx, *drift), ctx.dt)
        }
        BehaviorState::Orbiting {
            center,
            radius,
            angle,
            angular_speed,
            drift,
        } => {
            *center = center.offset(DVec2::new(0.0, *drift * ctx.dt));
            *angle += *angular_speed * ctx.dt;
            let position = center.offset(DVec2::from_angle(*angle) * *radius);
            let velocity = (position.vec() - ctx.position.vec()) / ctx.dt;
            MotionUpdate {
                position,
                velocity: velocity.into(),
            }
        }
        BehaviorState::Charge {
            delay_ticks,
            elapsed_ticks,
            burst_speed,
            charged,
        } => {
            let mut velocity = ctx.velocity.vec();
            if !*charged {
                *elapsed_ticks += 1;
                if *elapsed_ticks >= *delay_ticks {
                    *charged = true;
                    let dir = ctx
                        .nearest_opponent
                        .map(|target| ctx.position.direction_to(&target))
                        .filter(|d| *d != DVec2::ZERO)
                        .unwrap_or(DVec2::Y);
                    velocity = dir * *burst_speed;
                }
            }
            integrate(ctx.position, velocity, ctx.dt)
        }
        BehaviorState::Homing { speed, turn_rate } => {
            let velocity = match ctx.nearest_opponent {
                Some(target) => steer(
                    ctx.velocity.vec(),
                    ctx.position.direction_to(&target),
                    *speed,
                    *turn_rate * ctx.dt,
                ),
                None => ctx.velocity.vec(),
            };
            integrate(ctx.position, velocity, ctx.dt)
        }
        BehaviorState::Teleport {
            interval_ticks,
            timer,
        } => {
            *timer += 1;
            if *timer >= *interval_ticks {
                *timer = 0;
                let (x_lo, x_hi) = ctx.playfield.x_range(ctx.radius);
                let (y_lo, y_hi) = ctx.playfield.y_range(ctx.radius);
                let position = Position::new(rng.gen_range(x_lo..=x_hi), rng.gen_range(y_lo..=y_hi));
                return MotionUpdate {
                    position,
                    velocity: ctx.velocity,
                };
            }
            integrate(ctx.position, ctx.velocity.vec(), ctx.dt)
        }
        BehaviorState::Cloaked {
            interval_ticks,
            timer,
            visible,
        } => {
            *timer += 1;
            if *timer >= *interval_ticks {
                *timer = 0;
                *visible = !*visible;
            }
            integrate(ctx.position, ctx.velocity.vec(), ctx.dt)
        }
        BehaviorState::Kamikaze {
            acceleration,
            max_speed,
        } => {
            let mut velocity = ctx.velocity.vec();
            if let Some(target) = ctx.nearest_opponent {
                velocity += ctx.position.direction_to(&target) * *acceleration * ctx.dt;
                velocity = velocity.clamp_length_max(*max_speed);
            }
            integrate(ctx.position, velocity, ctx.dt)
        }
    }
}

fn step_player(speed: f64, ctx: &BehaviorContext) -> MotionUpdate {
    let intent = ctx.input.unwrap_or(DVec2::ZERO);
    // Analog intent below unit length is kept; anything longer is normalised.
    let dir = if intent.length_squared() > 1.0 {
        intent.normalize()
    } else {
        intent
    };
    let velocity = dir * speed;
    let position = ctx
        .playfield
        .clamp_inside(ctx.position.offset(velocity * ctx.dt), ctx.radius);
    MotionUpdate {
        position,
        velocity: velocity.into(),
    }
}

fn integrate(position: Position, velocity: DVec2, dt: f64) -> MotionUpdate {
    MotionUpdate {
        position: position.offset(velocity * dt),
        velocity: velocity.into(),
    }
}

/// Rotate `velocity` toward `desired_dir` by at most `max_turn` radians and
/// rescale it to `speed`. A stationary entity turns instantly.
pub fn steer(velocity: DVec2, desired_dir: DVec2, speed: f64, max_turn: f64) -> DVec2 {
    if desired_dir == DVec2::ZERO {
        return velocity;
    }
    let heading = velocity.normalize_or_zero();
    if heading == DVec2::ZERO {
        return desired_dir * speed;
    }
    let angle = heading.perp_dot(desired_dir).atan2(heading.dot(desired_dir));
    let turn = angle.clamp(-max_turn, max_turn);
    DVec2::from_angle(turn).rotate(heading) * speed
}
