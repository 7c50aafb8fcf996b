//! Read-only target lists shared by movement, firing and collision.

use hecs::{Entity, World};

use starfall_core::components::{BehaviorState, Body, Lifecycle, Ship, SpawnInfo};
use starfall_core::enums::{EntityKind, Faction};
use starfall_core::types::{EntityId, Position};

use crate::store::EntityStore;

/// A live ship as seen by targeting and collision.
#[derive(Debug, Clone, Copy)]
pub struct TargetInfo {
    pub entity: Entity,
    pub id: EntityId,
    pub kind: EntityKind,
    pub faction: Faction,
    pub position: Position,
    pub radius: f64,
    pub seq: u64,
    pub spawn_tick: u64,
}

/// Every alive, targetable ship in creation order. Cloaked ships that are
/// currently hidden are left out.
pub fn collect_targets(world: &World) -> Vec<TargetInfo> {
    let mut targets: Vec<TargetInfo> = world
        .query::<(&Ship, &Position, &Body, &BehaviorState, &SpawnInfo, &Lifecycle)>()
        .iter()
        .filter(|(_, (_, _, _, behavior, _, life))| life.alive && behavior.is_targetable())
        .map(|(entity, (ship, pos, body, _, info, _))| TargetInfo {
            entity,
            id: EntityStore::id(entity),
            kind: ship.kind,
            faction: ship.faction,
            position: *pos,
            radius: body.radius,
            seq: info.seq,
            spawn_tick: info.tick,
        })
        .collect();
    targets.sort_by_key(|t| t.seq);
    targets
}

/// Nearest target opposing `faction`, optionally within `max_range`.
/// Ties go to the earlier-created ship.
pub fn nearest_opposing<'a>(
    targets: &'a [TargetInfo],
    faction: Faction,
    from: Position,
    max_range: Option<f64>,
    mut skip: impl FnMut(&TargetInfo) -> bool,
) -> Option<&'a TargetInfo> {
    let mut best: Option<(&TargetInfo, f64)> = None;
    for target in targets {
        if !faction.opposes(target.faction) || skip(target) {
            continue;
        }
        let dist = from.distance_to(&target.position);
        if max_range.is_some_and(|range| dist > range) {
            continue;
        }
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((target, dist));
        }
    }
    best.map(|(target, _)| target)
}

/// The player ship, if one is alive.
pub fn find_player(world: &World) -> Option<(Entity, Position)> {
    world
        .query::<(&Ship, &Position, &Lifecycle)>()
        .iter()
        .find(|(_, (ship, _, life))| ship.kind == EntityKind::Player && life.alive)
        .map(|(entity, (_, pos, _))| (entity, *pos))
}
