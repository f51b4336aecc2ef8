//! Live traffic state: the capped raw log and the per-flow aggregate table.

pub mod key;
pub mod store;

pub use key::{FlowAggregate, FlowKey};
pub use store::{FlowStore, StoreCounts, StoreTotals, RAW_LOG_CAPACITY};
