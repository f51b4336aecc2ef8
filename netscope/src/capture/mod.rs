//! Capture boundary
//!
//! Everything that touches the kernel side lives here:
//! - Loading and attaching the `cgroup_skb` programs
//! - Decoding ring-buffer samples into [`TrafficEvent`](crate::domain::TrafficEvent)s

pub mod decode;
pub mod ebpf_setup;

pub use decode::decode_event;
pub use ebpf_setup::{
    attach_cgroup_programs, init_ebpf_logger, load_ebpf_program, take_traffic_ring,
};
