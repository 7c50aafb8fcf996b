//! Behavior dispatch for Starfall.
//!
//! Per-entity motion rules (weaving, orbiting, charging, homing, teleporting,
//! cloaking, ramming) and the spawn-time state each rule starts from.

pub mod dispatch;
pub mod profiles;

pub use starfall_core as core;
