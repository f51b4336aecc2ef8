//! Domain model for netscope
//!
//! This module contains core domain types and errors that provide:
//! - Compile-time safety via newtype pattern
//! - One canonical textual rendering per record field
//! - Structured error handling

pub mod errors;
pub mod event;
pub mod types;

// Re-export common types for convenience
pub use event::TrafficEvent;
pub use types::{AddressFamily, Direction, IfIndex, PacketType, Protocol};

pub use errors::{CaptureError, DecodeError, LookupError};
