//! Activity feed - a short, time-windowed log of what players did.
//!
//! Entries are stamped with the engine clock. The tick prunes anything older
//! than the retention window, and the log never grows past its capacity.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What kind of event an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Signup,
    UseItem,
    Craft,
    Gift,
}

/// One feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Engine clock when the entry was pushed (ms)
    pub at_ms: u64,
    pub kind: ActivityKind,
    /// Event details, e.g. `{"who": "orpheus", "item": "nest_egg"}`
    pub fields: Value,
}

/// Bounded, time-windowed activity log
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    retention_ms: u64,
    capacity: usize,
}

impl ActivityLog {
    pub fn new(retention_ms: u64, capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            retention_ms,
            capacity,
        }
    }

    /// Append an entry, evicting the oldest once at capacity
    pub fn push(&mut self, at_ms: u64, kind: ActivityKind, fields: Value) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ActivityEntry { at_ms, kind, fields });
    }

    /// Drop entries older than the retention window. Returns how many went.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(self.retention_ms);
        let before = self.entries.len();
        while self.entries.front().is_some_and(|e| e.at_ms < cutoff) {
            self.entries.pop_front();
        }
        before - self.entries.len()
    }

    /// Entries pushed at or after `since_ms`, oldest first
    pub fn since(&self, since_ms: u64) -> Vec<ActivityEntry> {
        self.entries
            .iter()
            .filter(|e| e.at_ms >= since_ms)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
