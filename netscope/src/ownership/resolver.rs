//! # Ownership Resolver
//!
//! Best-effort "who owns this address" labels for the flow view.
//!
//! ```text
//! render ──resolve(ip)──▶ private? ──yes──▶ "local/private"
//!                            │ no
//!                            ▼
//!                       OwnerCache hit? ──yes──▶ cached label
//!                            │ no
//!                            ▼
//!                  try_send(ip) on bounded queue ──▶ "resolving..."
//!                            ┆
//!            owner-resolver thread: lookup ─▶ extract ─▶ insert_if_absent
//! ```
//!
//! `resolve` never blocks: a full queue drops the request and a later render
//! pass asks again. Duplicate requests may be queued; the worker skips keys
//! already cached and the cache keeps the first label written for a key.

use std::collections::HashMap;
use std::io;
use std::net::IpAddr;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, info};

use crate::classification::is_local_or_private;
use crate::domain::LookupError;

use super::registry::extract_owner;

/// Label for loopback and private addresses
pub const LOCAL_LABEL: &str = "local/private";

/// Label while a lookup is outstanding
pub const RESOLVING_LABEL: &str = "resolving...";

/// Default capacity of the request queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// External directory that can answer "who owns `ip`" with a raw text body
pub trait DirectoryLookup: Send {
    /// # Errors
    /// Any failure; its text becomes the cached owner label
    fn lookup(&self, ip: IpAddr) -> Result<String, LookupError>;
}

impl<F> DirectoryLookup for F
where
    F: Fn(IpAddr) -> Result<String, LookupError> + Send,
{
    fn lookup(&self, ip: IpAddr) -> Result<String, LookupError> {
        self(ip)
    }
}

/// Write-once owner labels keyed by address text
#[derive(Debug, Default)]
pub struct OwnerCache {
    entries: RwLock<HashMap<String, String>>,
}

impl OwnerCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).contains_key(key)
    }

    /// Store `label` unless `key` already has one. Returns whether it was stored.
    pub fn insert_if_absent(&self, key: String, label: String) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&key) {
            return false;
        }
        entries.insert(key, label);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render-side handle: answers from the cache and queues misses
#[derive(Debug, Clone)]
pub struct OwnerResolver {
    cache: Arc<OwnerCache>,
    requests: Sender<IpAddr>,
}

impl OwnerResolver {
    /// Resolver plus the receiving end of its request queue, without a worker
    #[must_use]
    pub fn with_queue(capacity: usize) -> (Self, Receiver<IpAddr>) {
        let (requests, queue) = bounded(capacity);
        (Self { cache: Arc::new(OwnerCache::new()), requests }, queue)
    }

    /// Start the single `owner-resolver` worker thread.
    ///
    /// The worker exits once every clone of the returned resolver is dropped.
    ///
    /// # Errors
    /// Fails if the thread can't be spawned
    pub fn spawn<L>(capacity: usize, lookup: L) -> io::Result<(Self, JoinHandle<()>)>
    where
        L: DirectoryLookup + 'static,
    {
        let (resolver, queue) = Self::with_queue(capacity);
        let cache = Arc::clone(&resolver.cache);
        let handle = thread::Builder::new()
            .name("owner-resolver".to_string())
            .spawn(move || run_worker(&queue, &cache, &lookup))?;
        Ok((resolver, handle))
    }

    /// Owner label for `ip`; never blocks on the network
    #[must_use]
    pub fn resolve(&self, ip: IpAddr) -> String {
        if is_local_or_private(ip) {
            return LOCAL_LABEL.to_string();
        }
        let key = ip.to_string();
        if let Some(label) = self.cache.get(&key) {
            return label;
        }
        // Full queue: drop the request, the next render asks again
        let _ = self.requests.try_send(ip);
        RESOLVING_LABEL.to_string()
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<OwnerCache> {
        &self.cache
    }
}

/// Resolve queued addresses one at a time until the queue closes
pub fn run_worker(queue: &Receiver<IpAddr>, cache: &OwnerCache, lookup: &dyn DirectoryLookup) {
    info!("Owner resolver started");
    for ip in queue {
        let key = ip.to_string();
        if cache.contains(&key) {
            continue;
        }
        let label = match lookup.lookup(ip) {
            Ok(raw) => extract_owner(&raw),
            Err(e) => {
                debug!("Owner lookup for {ip} failed: {e}");
                e.to_string()
            }
        };
        debug!("Owner of {ip}: {label}");
        cache.insert_if_absent(key, label);
    }
    info!("Owner resolver stopped");
}
