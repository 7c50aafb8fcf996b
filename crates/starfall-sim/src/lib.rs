//! Simulation engine for Starfall.
//!
//! Owns the hecs entity arena, runs the combat systems at a fixed tick rate,
//! and produces `WorldSnapshot`s for whatever front end is attached.

pub mod context;
pub mod engine;
pub mod event_queue;
pub mod store;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use starfall_core as core;

#[cfg(test)]
mod tests;
