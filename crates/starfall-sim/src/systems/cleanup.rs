//! Cleanup system: despawns everything destroyed this tick and forgets its
//! cooldown entries.

use tracing::trace;

use crate::store::EntityStore;
use crate::systems::abilities::CooldownAbilityManager;

/// Compact the store. Returns the number of entities removed.
pub fn run(store: &mut EntityStore, cooldowns: &mut CooldownAbilityManager) -> usize {
    let removed = store.compact();
    cooldowns.release(&removed);
    if !removed.is_empty() {
        trace!(removed = removed.len(), live = store.len(), "compacted");
    }
    removed.len()
}
