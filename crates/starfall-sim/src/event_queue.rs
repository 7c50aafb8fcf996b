//! Time-ordered queue of deferred world actions.
//!
//! Staggered wave members, field drops, the level's boss arrival and level
//! transitions all go through here. The engine drains it once per tick.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use starfall_core::types::{ArchetypeId, BossId, HazardId, Position, PowerUpId};

/// An action to apply at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledAction {
    SpawnEnemy {
        archetype: ArchetypeId,
        position: Position,
        /// Boss escort; cancelled when the boss falls.
        escort: bool,
    },
    SpawnPowerUp {
        power_up: PowerUpId,
    },
    SpawnHazard {
        hazard: HazardId,
    },
    SpawnBoss {
        boss: BossId,
    },
    AdvanceLevel,
}

impl ScheduledAction {
    pub fn is_escort(&self) -> bool {
        matches!(self, ScheduledAction::SpawnEnemy { escort: true, .. })
    }

    /// Member of an ordinary wave; dropped when a boss arrives.
    pub fn is_wave_member(&self) -> bool {
        matches!(self, ScheduledAction::SpawnEnemy { escort: false, .. })
    }
}

#[derive(Debug)]
struct Scheduled {
    at: u64,
    seq: u64,
    action: ScheduledAction,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed: BinaryHeap is a max-heap and we want the earliest first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.at, other.seq).cmp(&(self.at, self.seq))
    }
}

/// Min-heap on (due tick, insertion order).
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: u64, action: ScheduledAction) {
        self.heap.push(Scheduled {
            at,
            seq: self.next_seq,
            action,
        });
        self.next_seq += 1;
    }

    /// Remove and return every action due at or before `now`, earliest first.
    /// Actions due on the same tick come out in the order they were scheduled.
    pub fn drain_due(&mut self, now: u64) -> Vec<ScheduledAction> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|s| s.at <= now) {
            if let Some(scheduled) = self.heap.pop() {
                due.push(scheduled.action);
            }
        }
        due
    }

    /// Drop every pending action matching `pred`. Returns how many were dropped.
    pub fn cancel(&mut self, pred: impl Fn(&ScheduledAction) -> bool) -> usize {
        let before = self.heap.len();
        self.heap.retain(|s| !pred(&s.action));
        before - self.heap.len()
    }

    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|s| s.at)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
