//! IP ownership enrichment for the flow view
//!
//! - [`resolver`]: non-blocking cache front end and the single lookup worker
//! - [`whois`]: production [`DirectoryLookup`] over TCP port 43
//! - [`registry`]: attribute a whois body to a registry and pull out the owner

pub mod registry;
pub mod resolver;
pub mod whois;

pub use registry::{extract_owner, Registry, UNKNOWN_OWNER};
pub use resolver::{
    run_worker, DirectoryLookup, OwnerCache, OwnerResolver, DEFAULT_QUEUE_CAPACITY, LOCAL_LABEL,
    RESOLVING_LABEL,
};
pub use whois::WhoisClient;
