//! Predicate evaluation for parsed filters.
//!
//! Every field is compared against its canonical text rendering:
//! protocols and directions case-insensitively, ports as exact decimal
//! strings, addresses with [`ip_matches`] after IPv4-mapped addresses are
//! rendered as IPv4. Set fields are AND-ed; unset fields always pass.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::classification::canonical;
use crate::domain::TrafficEvent;
use crate::flow::{FlowAggregate, FlowKey};

use super::query::{FlowFilter, RawFilter};

/// A parsed filter that can be evaluated against rows of type `T`
pub trait RowFilter<T> {
    fn matches(&self, row: &T) -> bool;

    /// An empty filter matches every row
    fn is_empty(&self) -> bool;
}

/// Evaluate `filter` against one row
pub fn matches<T, F: RowFilter<T>>(row: &T, filter: &F) -> bool {
    filter.is_empty() || filter.matches(row)
}

/// Keep the rows that pass `filter`, preserving order
pub fn apply<T, F: RowFilter<T>>(rows: Vec<T>, filter: &F) -> Vec<T> {
    if filter.is_empty() {
        return rows;
    }
    rows.into_iter().filter(|row| filter.matches(row)).collect()
}

/// Three-tier address match: exact text, then substring, then CIDR containment.
#[must_use]
pub fn ip_matches(ip_text: &str, pattern: &str) -> bool {
    if pattern.is_empty() || ip_text == pattern || ip_text.contains(pattern) {
        return true;
    }
    match (pattern.parse::<IpNet>(), ip_text.parse::<IpAddr>()) {
        (Ok(net), Ok(ip)) => net.contains(&ip),
        _ => false,
    }
}

fn text_field(expected: Option<&str>, actual: impl FnOnce() -> String) -> bool {
    expected.map_or(true, |want| actual().eq_ignore_ascii_case(want))
}

fn port_field(expected: Option<&str>, port: u16) -> bool {
    expected.map_or(true, |want| port.to_string() == want)
}

fn ip_field(expected: Option<&str>, ip: IpAddr) -> bool {
    expected.map_or(true, |want| ip_matches(&canonical(ip).to_string(), want))
}

impl RowFilter<TrafficEvent> for RawFilter {
    fn matches(&self, ev: &TrafficEvent) -> bool {
        text_field(self.protocol.as_deref(), || ev.protocol.to_string())
            && ip_field(self.src_ip.as_deref(), ev.src)
            && ip_field(self.dst_ip.as_deref(), ev.dst)
            && port_field(self.src_port.as_deref(), ev.src_port)
            && port_field(self.dst_port.as_deref(), ev.dst_port)
            && text_field(self.direction.as_deref(), || ev.direction.to_string())
    }

    fn is_empty(&self) -> bool {
        RawFilter::is_empty(self)
    }
}

impl RowFilter<(FlowKey, FlowAggregate)> for FlowFilter {
    fn matches(&self, (key, agg): &(FlowKey, FlowAggregate)) -> bool {
        text_field(self.protocol.as_deref(), || key.protocol.to_string())
            && ip_field(self.ip.as_deref(), key.ip())
            && port_field(self.port.as_deref(), key.port)
            && self.min_bytes().map_or(true, |min| agg.total_bytes >= min)
            && self.max_bytes().map_or(true, |max| agg.total_bytes <= max)
    }

    fn is_empty(&self) -> bool {
        FlowFilter::is_empty(self)
    }
}
