//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

use crate::view::ViewKind;

#[derive(Parser, Debug)]
#[command(
    name = "netscope",
    about = "Live per-flow network traffic dashboard for a cgroup",
    after_help = "\
EXAMPLES:
    sudo netscope                                    Watch every process (root cgroup)
    sudo netscope --cgroup /sys/fs/cgroup/app.slice  Watch one cgroup
    sudo netscope --view flows --hide-local          Start on the flow table, external peers only
    sudo netscope --headless --duration 60           Log a flow summary for a minute"
)]
pub struct Args {
    /// cgroup v2 directory the capture programs attach to
    #[arg(long, value_name = "PATH", default_value = "/sys/fs/cgroup")]
    pub cgroup: PathBuf,

    /// Compiled eBPF object (built by `cargo xtask build-ebpf`)
    #[arg(
        long,
        value_name = "PATH",
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/../target/bpfel-unknown-none/release/netscope")
    )]
    pub bpf_object: PathBuf,

    /// Events buffered between capture and the store before dropping
    #[arg(long, default_value_t = crate::pipeline::DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,

    /// Pending drop notices kept for the dashboard
    #[arg(long, default_value_t = crate::pipeline::DEFAULT_NOTICE_CAPACITY)]
    pub notice_capacity: usize,

    /// Events kept in the raw log
    #[arg(long, default_value_t = crate::flow::RAW_LOG_CAPACITY)]
    pub raw_log_capacity: usize,

    /// Pending ownership lookups before new requests are skipped
    #[arg(long, default_value_t = crate::ownership::DEFAULT_QUEUE_CAPACITY)]
    pub owner_queue: usize,

    /// Deadline in seconds for one whole whois lookup
    #[arg(long, value_name = "SECS", default_value = "5")]
    pub whois_timeout: u64,

    /// View shown at startup
    #[arg(long, value_enum, default_value_t = ViewKind::Raw)]
    pub view: ViewKind,

    /// Hide loopback, private and link-local peers
    #[arg(long)]
    pub hide_local: bool,

    /// Stop after N seconds (0 = unlimited)
    #[arg(long, value_name = "SECS", default_value = "0")]
    pub duration: u64,

    /// Run without TUI, logging a flow summary periodically
    #[arg(long)]
    pub headless: bool,

    /// Seconds between headless summaries
    #[arg(long, value_name = "SECS", default_value = "10")]
    pub summary_interval: u64,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["netscope"]).unwrap();
        assert_eq!(args.cgroup, PathBuf::from("/sys/fs/cgroup"));
        assert_eq!(args.buffer_capacity, 1 << 20);
        assert_eq!(args.notice_capacity, 8);
        assert_eq!(args.raw_log_capacity, 3000);
        assert_eq!(args.owner_queue, 1000);
        assert_eq!(args.whois_timeout, 5);
        assert_eq!(args.view, ViewKind::Raw);
        assert!(!args.hide_local);
        assert!(!args.headless);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_view_and_flags() {
        let args = Args::try_parse_from([
            "netscope",
            "--view",
            "flows",
            "--hide-local",
            "--headless",
            "--duration",
            "30",
            "-q",
        ])
        .unwrap();
        assert_eq!(args.view, ViewKind::Flows);
        assert!(args.hide_local && args.headless && args.quiet);
        assert_eq!(args.duration, 30);
    }

    #[test]
    fn test_rejects_unknown_view() {
        assert!(Args::try_parse_from(["netscope", "--view", "graph"]).is_err());
    }
}
