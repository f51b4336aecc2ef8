//! Filter engine
//!
//! - [`query`]: parse `key=value` queries into [`RawFilter`] / [`FlowFilter`]
//! - [`matcher`]: evaluate them against events and flows
//! - [`FilterState`]: which filter is in force for which view

pub mod matcher;
pub mod query;

pub use matcher::{apply, ip_matches, matches, RowFilter};
pub use query::{FlowFilter, RawFilter};

use crate::view::ViewKind;

/// Active filters for both views.
///
/// At most one view carries a filter at a time: committing a query for one
/// view, switching views, or committing an empty query resets the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub raw: RawFilter,
    pub flows: FlowFilter,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply query `text` to `view`. Empty text clears both filters.
    pub fn commit(&mut self, view: ViewKind, text: &str) {
        if text.trim().is_empty() {
            self.clear();
            return;
        }
        match view {
            ViewKind::Raw => {
                self.raw = RawFilter::parse(text);
                self.flows = FlowFilter::default();
            }
            ViewKind::Flows => {
                self.flows = FlowFilter::parse(text);
                self.raw = RawFilter::default();
            }
        }
    }

    /// Drop the filter of the view being left
    pub fn switch_view(&mut self, from: ViewKind) {
        match from {
            ViewKind::Raw => self.raw = RawFilter::default(),
            ViewKind::Flows => self.flows = FlowFilter::default(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_active(&self, view: ViewKind) -> bool {
        match view {
            ViewKind::Raw => !self.raw.is_empty(),
            ViewKind::Flows => !self.flows.is_empty(),
        }
    }

    /// Canonical query text for the filter on `view`, empty if none
    #[must_use]
    pub fn describe(&self, view: ViewKind) -> String {
        let fields: Vec<(&str, &Option<String>)> = match view {
            ViewKind::Raw => vec![
                ("proto", &self.raw.protocol),
                ("src", &self.raw.src_ip),
                ("dst", &self.raw.dst_ip),
                ("sport", &self.raw.src_port),
                ("dport", &self.raw.dst_port),
                ("dir", &self.raw.direction),
            ],
            ViewKind::Flows => vec![
                ("proto", &self.flows.protocol),
                ("ip", &self.flows.ip),
                ("port", &self.flows.port),
                ("minbytes", &self.flows.min_bytes),
                ("maxbytes", &self.flows.max_bytes),
            ],
        };
        fields
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}={v}")))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
