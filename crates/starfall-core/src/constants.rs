//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Playfield ---

/// Default playfield width (units).
pub const PLAYFIELD_WIDTH: f64 = 800.0;

/// Default playfield height (units).
pub const PLAYFIELD_HEIGHT: f64 = 600.0;

/// Distance outside the playfield a ship may travel before it is culled.
pub const SHIP_CULL_MARGIN: f64 = 80.0;

/// Distance outside the playfield a projectile may travel before it is culled.
pub const PROJECTILE_CULL_MARGIN: f64 = 16.0;

// --- Player ---

/// Player spawn position as a fraction of the playfield height.
pub const PLAYER_SPAWN_HEIGHT_FRACTION: f64 = 0.85;

/// Ticks of invulnerability after the player takes damage.
pub const PLAYER_INVULNERABLE_TICKS: u32 = 45;

/// Highest upgrade level an ability loadout can reach.
pub const MAX_UPGRADE_LEVEL: u32 = 5;

/// Angle between extra spread-shot pellets (radians).
pub const SPREAD_SHOT_STEP: f64 = 0.12;

// --- Behaviors ---

/// Default oscillation amplitude (units).
pub const OSCILLATION_AMPLITUDE: f64 = 60.0;

/// Default oscillation angular frequency (radians per second).
pub const OSCILLATION_FREQUENCY: f64 = 2.5;

/// Default orbit radius (units).
pub const ORBIT_RADIUS: f64 = 70.0;

/// Default orbit angular speed (radians per second).
pub const ORBIT_ANGULAR_SPEED: f64 = 1.8;

/// Idle delay before a charger bursts (ticks).
pub const CHARGE_DELAY_TICKS: u32 = 60;

/// Charger burst speed multiplier relative to its cruise speed.
pub const CHARGE_BURST_FACTOR: f64 = 3.5;

/// Homing steer rate (radians per second).
pub const HOMING_TURN_RATE: f64 = 2.0;

/// Interval between teleports (ticks).
pub const TELEPORT_INTERVAL_TICKS: u32 = 150;

/// Interval between cloak toggles (ticks).
pub const CLOAK_INTERVAL_TICKS: u32 = 90;

/// Kamikaze acceleration (units per second squared).
pub const KAMIKAZE_ACCELERATION: f64 = 220.0;

/// Kamikaze speed cap as a multiple of its cruise speed.
pub const KAMIKAZE_MAX_SPEED_FACTOR: f64 = 2.5;

/// Gravity well pull on the player per unit of intensity (units/s).
pub const GRAVITY_WELL_PULL: f64 = 1.5;

// --- Spawning ---

/// Ticks between consecutive members of one wave.
pub const WAVE_STAGGER_TICKS: u64 = 12;

/// Horizontal spacing between wave members (units).
pub const WAVE_SPACING: f64 = 70.0;

/// Delay between a boss defeat and the start of the next level (ticks).
pub const LEVEL_TRANSITION_TICKS: u64 = 180;

/// Enemy health multiplier applied per full pass through the level list.
pub const DIFFICULTY_STEP: f64 = 0.5;

// --- Boss ---

/// Floor for a boss attack cooldown after phase scaling (ticks).
pub const BOSS_MIN_ATTACK_COOLDOWN_TICKS: u64 = 10;
