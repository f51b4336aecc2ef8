//! # Flow Store
//!
//! The live state behind both views, guarded by a single lock:
//!
//! - **raw log**: the most recent events in arrival order, capped FIFO
//! - **flow table**: one [`FlowAggregate`] per [`FlowKey`], never evicted
//!
//! [`FlowStore::record`] appends and folds under one write guard, so a
//! reader sees either both effects of an event or neither. Snapshots copy
//! out under a read guard; formatting happens after the guard is dropped.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::TrafficEvent;

use super::key::{FlowAggregate, FlowKey};

/// Default raw log capacity
pub const RAW_LOG_CAPACITY: usize = 3000;

#[derive(Debug, Default)]
struct Inner {
    raw: VecDeque<TrafficEvent>,
    flows: HashMap<FlowKey, FlowAggregate>,
    recorded: u64,
}

impl Inner {
    fn push(&mut self, event: TrafficEvent, capacity: usize) {
        let remote = event.remote_ip();
        self.flows.entry(FlowKey::from_event(&event)).or_default().fold(&event, remote);
        if self.raw.len() == capacity {
            self.raw.pop_front();
        }
        self.raw.push_back(event);
        self.recorded += 1;
    }
}

/// Sizes of both structures at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub raw: usize,
    pub flows: usize,
    /// Events recorded since start, including evicted ones
    pub recorded: u64,
}

/// Event count and the flow table's sums, read under one guard
///
/// `packets` always equals `recorded`: every recorded event lands in
/// exactly one flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreTotals {
    pub recorded: u64,
    pub packets: u64,
    pub bytes: u64,
}

#[derive(Debug)]
pub struct FlowStore {
    capacity: usize,
    inner: RwLock<Inner>,
}

impl Default for FlowStore {
    fn default() -> Self {
        Self::new(RAW_LOG_CAPACITY)
    }
}

impl FlowStore {
    /// Create a store whose raw log holds at most `raw_capacity` events.
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(raw_capacity: usize) -> Self {
        let capacity = raw_capacity.max(1);
        let inner = Inner { raw: VecDeque::with_capacity(capacity), ..Inner::default() };
        Self { capacity, inner: RwLock::new(inner) }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `event` to the raw log and fold it into its flow
    pub fn record(&self, event: TrafficEvent) {
        self.write().push(event, self.capacity);
    }

    /// Record every event from `events` under a single write guard
    pub fn record_all(&self, events: impl IntoIterator<Item = TrafficEvent>) {
        let mut inner = self.write();
        for event in events {
            inner.push(event, self.capacity);
        }
    }

    /// Copy of the raw log, oldest first
    #[must_use]
    pub fn raw_snapshot(&self) -> Vec<TrafficEvent> {
        self.read().raw.iter().cloned().collect()
    }

    /// Copy of the flow table, in no particular order
    #[must_use]
    pub fn flow_snapshot(&self) -> Vec<(FlowKey, FlowAggregate)> {
        self.read().flows.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Current aggregate for `key`, if the flow has been seen
    #[must_use]
    pub fn flow(&self, key: &FlowKey) -> Option<FlowAggregate> {
        self.read().flows.get(key).copied()
    }

    #[must_use]
    pub fn counts(&self) -> StoreCounts {
        let inner = self.read();
        StoreCounts { raw: inner.raw.len(), flows: inner.flows.len(), recorded: inner.recorded }
    }

    /// Walks the whole flow table; for periodic summaries, not per frame
    #[must_use]
    pub fn totals(&self) -> StoreTotals {
        let inner = self.read();
        inner.flows.values().fold(
            StoreTotals { recorded: inner.recorded, ..StoreTotals::default() },
            |acc, agg| StoreTotals {
                packets: acc.packets.saturating_add(agg.packets),
                bytes: acc.bytes.saturating_add(agg.total_bytes),
                ..acc
            },
        )
    }
}
