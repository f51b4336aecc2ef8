//! Filter query parsing.
//!
//! A query is whitespace-separated `key=value` tokens. Keys are
//! case-insensitive, values are kept verbatim. Tokens without `=`, unknown
//! keys and empty values are ignored; a repeated key keeps its last value.

/// Filter over raw log events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFilter {
    pub protocol: Option<String>,
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub src_port: Option<String>,
    pub dst_port: Option<String>,
    pub direction: Option<String>,
}

/// Filter over aggregated flows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowFilter {
    pub protocol: Option<String>,
    pub ip: Option<String>,
    pub port: Option<String>,
    pub min_bytes: Option<String>,
    pub max_bytes: Option<String>,
}

/// Split a query into lowercase keys and verbatim non-empty values
fn tokens(text: &str) -> impl Iterator<Item = (String, String)> + '_ {
    text.split_whitespace().filter_map(|token| {
        let (key, value) = token.split_once('=')?;
        if value.is_empty() {
            return None;
        }
        Some((key.to_ascii_lowercase(), value.to_string()))
    })
}

impl RawFilter {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut filter = Self::default();
        for (key, value) in tokens(text) {
            let slot = match key.as_str() {
                "proto" | "protocol" => &mut filter.protocol,
                "src" | "srcip" => &mut filter.src_ip,
                "dst" | "dstip" => &mut filter.dst_ip,
                "sport" | "srcport" => &mut filter.src_port,
                "dport" | "dstport" => &mut filter.dst_port,
                "dir" | "direction" => &mut filter.direction,
                _ => continue,
            };
            *slot = Some(value);
        }
        filter
    }

    /// True when no field is set; an empty filter matches everything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl FlowFilter {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut filter = Self::default();
        for (key, value) in tokens(text) {
            let slot = match key.as_str() {
                "proto" | "protocol" => &mut filter.protocol,
                "ip" => &mut filter.ip,
                "port" => &mut filter.port,
                "minbytes" => &mut filter.min_bytes,
                "maxbytes" => &mut filter.max_bytes,
                _ => continue,
            };
            *slot = Some(value);
        }
        filter
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Lower bound on total bytes; an unparseable value is no bound
    #[must_use]
    pub fn min_bytes(&self) -> Option<u64> {
        self.min_bytes.as_deref().and_then(|v| v.parse().ok())
    }

    /// Upper bound on total bytes; an unparseable value is no bound
    #[must_use]
    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes.as_deref().and_then(|v| v.parse().ok())
    }
}
