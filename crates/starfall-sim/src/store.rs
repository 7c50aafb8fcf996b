//! Entity arena.
//!
//! Wraps the hecs `World` with a creation counter and a deferred removal list.
//! Destroying an entity only flips its `Lifecycle`; the handle stays valid
//! until `compact` runs in cleanup, so systems later in the same tick can
//! still read a dead entity's components.

use hecs::{DynamicBundle, Entity, EntityBuilder, World};

use starfall_core::components::{Lifecycle, SpawnInfo};
use starfall_core::enums::RemovalCause;
use starfall_core::types::EntityId;

#[derive(Default)]
pub struct EntityStore {
    world: World,
    next_seq: u64,
    doomed: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Spawn `bundle` stamped with a creation sequence number and `tick`.
    pub fn spawn(&mut self, tick: u64, bundle: impl DynamicBundle) -> Entity {
        let info = SpawnInfo {
            seq: self.next_seq,
            tick,
        };
        self.next_seq += 1;
        let mut builder = EntityBuilder::new();
        builder
            .add_bundle(bundle)
            .add(info)
            .add(Lifecycle::default());
        self.world.spawn(builder.build())
    }

    /// Mark an entity dead. Returns true only for the call that actually
    /// flipped the flag; later calls and unknown entities are no-ops.
    pub fn destroy(&mut self, entity: Entity, cause: RemovalCause) -> bool {
        let Ok(mut life) = self.world.get::<&mut Lifecycle>(entity) else {
            return false;
        };
        if !life.alive {
            return false;
        }
        life.alive = false;
        life.cause = Some(cause);
        drop(life);
        self.doomed.push(entity);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world
            .get::<&Lifecycle>(entity)
            .map(|life| life.alive)
            .unwrap_or(false)
    }

    /// Tick on which an entity was created.
    pub fn spawn_tick(&self, entity: Entity) -> Option<u64> {
        self.world.get::<&SpawnInfo>(entity).ok().map(|info| info.tick)
    }

    /// Despawn everything destroyed since the last compaction. Returns the
    /// removed handles in destruction order.
    pub fn compact(&mut self) -> Vec<Entity> {
        let removed = std::mem::take(&mut self.doomed);
        for &entity in &removed {
            let _ = self.world.despawn(entity);
        }
        removed
    }

    /// Drop every entity. Handles start over from a fresh world; the sequence
    /// counter keeps counting.
    pub fn clear(&mut self) {
        self.world = World::new();
        self.doomed.clear();
    }

    pub fn len(&self) -> u32 {
        self.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Outward-facing id for a handle (index and generation packed).
    pub fn id(entity: Entity) -> EntityId {
        EntityId(entity.to_bits().get())
    }

    pub fn entity(id: EntityId) -> Option<Entity> {
        Entity::from_bits(id.0)
    }
}
