//! Per-tick context handed to every subsystem call.

use starfall_core::types::Playfield;

/// Everything a system needs to know about "now". Built once per tick by the
/// engine; systems never read ambient engine state.
#[derive(Debug, Clone, Copy)]
pub struct TickContext {
    pub tick: u64,
    pub dt: f64,
    pub playfield: Playfield,
    /// Current 1-based level number.
    pub level: u32,
    /// Enemy health multiplier for the current pass through the level list.
    pub difficulty: f64,
}
