//! Systems that operate on the entity store each tick.
//!
//! Most systems are free functions over the store. The few that carry state
//! across ticks (cooldowns, spawn timers, the boss encounter, run stats) own
//! it in a small struct the engine keeps.

pub mod abilities;
pub mod boss;
pub mod cleanup;
pub mod collision;
pub mod movement;
pub mod snapshot;
pub mod spawn_director;
pub mod stats;
pub mod targeting;
