//! # netscope - eBPF-based Live Network Traffic Dashboard
//!
//! netscope attaches `cgroup_skb` programs to a cgroup v2 directory, streams
//! one record per packet through a bounded pipeline, and keeps two views of
//! the traffic: a rolling log of recent events and a per-remote-endpoint
//! aggregate. A terminal dashboard filters, labels and renders either view at
//! 30 frames per second.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │               eBPF Programs (Kernel, cgroup_skb)                │
//! │  • monitor_ingress / monitor_egress: one record per packet      │
//! └───────────────────────┬─────────────────────────────────────────┘
//!                         │ TRAFFIC_RING (ring buffer)
//!                         ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    netscope (This Crate)                        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │   Capture    │──▶│   Pipeline   │──▶│  Flow Store  │         │
//! │  │   (decode)   │   │ (bounded,    │   │ (raw log +   │         │
//! │  └──────────────┘   │  lossy)      │   │  aggregates) │         │
//! │                     └──────────────┘   └──────┬───────┘         │
//! │                                               │ snapshots       │
//! │                                               ▼                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐         │
//! │  │  Ownership   │◀──│     TUI      │◀──│ View/Filter  │         │
//! │  │  (whois)     │   │  (30 Hz)     │   │              │         │
//! │  └──────────────┘   └──────────────┘   └──────────────┘         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`capture`]: load and attach the eBPF object, decode ring buffer records
//! - [`pipeline`]: bounded event channel with drop-on-full backpressure and
//!   a lossy drop-notice channel
//! - [`flow`]: [`flow::FlowStore`], the raw log and per-flow aggregate behind
//!   one lock
//! - [`filter`]: `key=value` filter parsing and matching for both views
//! - [`ownership`]: asynchronous whois lookups with a first-writer-wins cache
//! - [`classification`]: local/private address checks and interface names
//! - [`scheduler`]: the ingest poller, frame ticker and scroll state
//! - [`view`]: visible rows per view
//! - [`tui`]: the interactive dashboard
//! - [`report`]: headless summaries
//! - [`cli`], [`preflight`], [`domain`]: arguments, startup checks, core types
//!
//! ## Operational Modes
//!
//! 1. **Live TUI Mode** (default): interactive dashboard
//! 2. **Headless Mode** (`--headless`): periodic flow summaries on stderr
//!
//! ## Typical Usage
//!
//! ```bash
//! cargo xtask build-ebpf
//! sudo ./netscope --cgroup /sys/fs/cgroup
//! ```

pub mod capture;
pub mod classification;
pub mod cli;
pub mod domain;
pub mod filter;
pub mod flow;
pub mod ownership;
pub mod pipeline;
pub mod preflight;
pub mod report;
pub mod scheduler;
pub mod tui;
pub mod view;
