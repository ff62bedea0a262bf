//! Scheduled obstacle removal
//!
//! A min-heap of (due tick, obstacle id). Entries are only popped when the
//! session is running, so anything that comes due during a pause waits and
//! fires on the first unpaused tick.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::state::Session;
use crate::tuning::ExpiryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExpiryEntry {
    pub due: u64,
    pub obstacle_id: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ExpiryQueue {
    heap: BinaryHeap<Reverse<ExpiryEntry>>,
}

impl ExpiryQueue {
    pub fn schedule(&mut self, due: u64, obstacle_id: u32) {
        self.heap.push(Reverse(ExpiryEntry { due, obstacle_id }));
    }

    /// Earliest pending entry
    pub fn peek(&self) -> Option<ExpiryEntry> {
        self.heap.peek().map(|Reverse(e)| *e)
    }

    /// Pop the earliest entry if it is due at `now`
    pub fn pop_due(&mut self, now: u64) -> Option<ExpiryEntry> {
        match self.heap.peek() {
            Some(Reverse(e)) if e.due <= now => self.heap.pop().map(|Reverse(e)| e),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Fire every due entry, returning the number of obstacles removed.
///
/// Does nothing while paused or over; the entries stay queued.
pub fn fire_due(session: &mut Session) -> usize {
    if session.state.paused || session.state.game_over {
        return 0;
    }

    let now = session.clock();
    let mut removed = 0;
    while let Some(entry) = session.expiry.pop_due(now) {
        let hit = match session.tuning.expiry_policy {
            ExpiryPolicy::Targeted => session.remove_obstacle(entry.obstacle_id).is_some(),
            ExpiryPolicy::Oldest => {
                if session.obstacles.is_empty() {
                    false
                } else {
                    session.obstacles.remove(0);
                    true
                }
            }
        };
        if hit {
            removed += 1;
        }
    }
    removed
}
