use std::collections::VecDeque;

use serde::Serialize;

use crate::zone::ZoneId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionHistoryEntry {
    pub zone_id: ZoneId,
    pub timestamp: u64,
}

/// Bounded FIFO log of recent selections. The oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct DistributionHistory {
    entries: VecDeque<DistributionHistoryEntry>,
    capacity: usize,
}

impl DistributionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, returning the one evicted to stay within capacity.
    pub fn push(
        &mut self,
        zone_id: impl Into<ZoneId>,
        timestamp: u64,
    ) -> Option<DistributionHistoryEntry> {
        self.entries.push_back(DistributionHistoryEntry {
            zone_id: zone_id.into(),
            timestamp,
        });
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Up to `count` most recent entries, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &DistributionHistoryEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistributionHistoryEntry> {
        self.entries.iter()
    }
}
