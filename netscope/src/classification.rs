//! Address locality classification.
//!
//! Decides whether a remote endpoint is "local" (loopback, private,
//! multicast, link-local) or externally routable. The flow store uses it for
//! the per-flow locality flag, the raw view for its Type column and the
//! show-local toggle, and the ownership resolver for its synchronous
//! `local/private` shortcut.
//!
//! # Classification rules
//!
//! | Range                         | [`is_local`] | [`is_local_or_private`] |
//! |-------------------------------|:------------:|:-----------------------:|
//! | `127.0.0.0/8`, `::1`          | yes          | yes                     |
//! | RFC 1918, `fc00::/7`          | yes          | yes                     |
//! | `224.0.0.0/4`, `ff00::/8`     | yes          | no                      |
//! | `169.254.0.0/16`, `fe80::/10` | yes          | no                      |
//!
//! IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are classified as their
//! IPv4 form.

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::{PoisonError, RwLock};

use crate::domain::IfIndex;

/// Label used when an interface index has no name
pub const UNKNOWN_INTERFACE: &str = "Unknown";

/// IPv4-mapped IPv6 addresses as plain IPv4; everything else unchanged
#[must_use]
pub fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(ip, IpAddr::V4),
        IpAddr::V4(_) => ip,
    }
}

fn is_unique_local(v6: &Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xfe00) == 0xfc00
}

fn is_unicast_link_local(v6: &Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xffc0) == 0xfe80
}

fn v4_is_local(v4: &Ipv4Addr) -> bool {
    v4.is_loopback() || v4.is_private() || v4.is_multicast() || v4.is_link_local()
}

fn v6_is_local(v6: &Ipv6Addr) -> bool {
    v6.is_loopback() || is_unique_local(v6) || v6.is_multicast() || is_unicast_link_local(v6)
}

/// Loopback, private, multicast or link-local
#[must_use]
pub fn is_local(ip: IpAddr) -> bool {
    match canonical(ip) {
        IpAddr::V4(v4) => v4_is_local(&v4),
        IpAddr::V6(v6) => v6_is_local(&v6),
    }
}

/// Loopback or private only; multicast and link-local don't count
#[must_use]
pub fn is_local_or_private(ip: IpAddr) -> bool {
    match canonical(ip) {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private(),
        IpAddr::V6(v6) => v6.is_loopback() || is_unique_local(&v6),
    }
}

/// Family + locality of an address, shown in the raw view's Type column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpKind {
    V4Local,
    V4External,
    V6Local,
    V6External,
}

impl IpKind {
    #[must_use]
    pub fn of(ip: IpAddr) -> Self {
        match canonical(ip) {
            IpAddr::V4(v4) if v4_is_local(&v4) => IpKind::V4Local,
            IpAddr::V4(_) => IpKind::V4External,
            IpAddr::V6(v6) if v6_is_local(&v6) => IpKind::V6Local,
            IpAddr::V6(_) => IpKind::V6External,
        }
    }

    #[must_use]
    pub fn is_local(self) -> bool {
        matches!(self, IpKind::V4Local | IpKind::V6Local)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IpKind::V4Local => "v4Local",
            IpKind::V4External => "v4External",
            IpKind::V6Local => "v6Local",
            IpKind::V6External => "v6External",
        }
    }
}

impl fmt::Display for IpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memoising classifier shared by the render path.
///
/// The cache only ever grows; entries are pure functions of the key so a
/// racing double insert is harmless.
#[derive(Debug, Default)]
pub struct IpClassifier {
    cache: RwLock<HashMap<IpAddr, IpKind>>,
}

impl IpClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn classify(&self, ip: IpAddr) -> IpKind {
        if let Some(kind) = self.cache.read().unwrap_or_else(PoisonError::into_inner).get(&ip) {
            return *kind;
        }
        let kind = IpKind::of(ip);
        self.cache.write().unwrap_or_else(PoisonError::into_inner).insert(ip, kind);
        kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface name for `index`, or `None` when the kernel has no such interface
#[allow(unsafe_code)] // if_indextoname writes into a caller-provided buffer
#[must_use]
pub fn interface_name(index: IfIndex) -> Option<String> {
    let mut buf = [0 as libc::c_char; libc::IF_NAMESIZE];
    // SAFETY: buf is IF_NAMESIZE bytes as the call requires; on success it holds a NUL-terminated name
    let ptr = unsafe { libc::if_indextoname(index.0, buf.as_mut_ptr()) };
    if ptr.is_null() {
        return None;
    }
    // SAFETY: non-null return points into buf, which is NUL-terminated
    let name = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
    Some(name.to_string_lossy().into_owned())
}

/// Per-app memo of interface names
#[derive(Debug, Default)]
pub struct InterfaceNames {
    names: HashMap<IfIndex, String>,
}

impl InterfaceNames {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, index: IfIndex) -> &str {
        self.names
            .entry(index)
            .or_insert_with(|| interface_name(index).unwrap_or_else(|| UNKNOWN_INTERFACE.to_string()))
    }
}
