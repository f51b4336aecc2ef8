//! # netscope - Main Entry Point
//!
//! Supports two operational modes:
//! - **Live TUI** (default): interactive dashboard over the raw log and flow table
//! - **Headless** (`--headless`): periodic flow summaries on stderr
//!
//! Thread layout:
//! - main (tokio): drains the eBPF ring buffer into the pipeline
//! - `ingest-poller`: moves pipeline events into the flow store
//! - `owner-resolver`: whois lookups for flow owners
//! - TUI thread: 30 Hz dashboard (live mode only)

// Main function is intentionally long for clarity; time conversions lose precision for display
#![allow(clippy::too_many_lines, clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, warn};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::io::unix::AsyncFd;

use netscope::capture::{
    attach_cgroup_programs, init_ebpf_logger, load_ebpf_program, take_traffic_ring,
};
use netscope::cli::Args;
use netscope::flow::FlowStore;
use netscope::ownership::{OwnerResolver, WhoisClient};
use netscope::pipeline::{self, Offer};
use netscope::preflight::run_preflight_checks;
use netscope::report::display_summary;
use netscope::scheduler::spawn_poller;
use netscope::tui::{self, LiveOptions};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

/// Upper bound on how long the loop waits before re-checking exit conditions
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_millis(100);

fn main() {
    // clap exits with status 2 on its own for malformed arguments
    let args = Args::parse();
    if let Err(e) = init_logging(args.log_file.as_deref()) {
        eprintln!("error: {e:#}");
        std::process::exit(EXIT_USAGE);
    }

    std::process::exit(match run(args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = format!("{err:#}").to_lowercase();
    if msg.contains("permission denied") || msg.contains("requires root") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

/// `RUST_LOG` controls the level (default `warn`); `--log-file` keeps log
/// lines off the dashboard's terminal.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

#[tokio::main]
async fn run(args: Args) -> Result<()> {
    let quiet = args.quiet;

    // Run pre-flight checks before anything else
    run_preflight_checks(&args.cgroup)?;

    if !quiet {
        println!("netscope v{}", env!("CARGO_PKG_VERSION"));
        println!("cgroup: {}", args.cgroup.display());
    }

    // ── Load and attach the capture programs ────────────────────────────
    let mut bpf = load_ebpf_program(&args.bpf_object)
        .context("Did you build it first? Run: cargo xtask build-ebpf")?;
    init_ebpf_logger(&mut bpf);
    attach_cgroup_programs(&mut bpf, &args.cgroup)?;
    let ring = take_traffic_ring(&mut bpf)?;
    let mut ring = AsyncFd::new(ring).context("Failed to register traffic ring buffer")?;

    // ── Pipeline, store, resolver, poller ───────────────────────────────
    let (producer, consumer) = pipeline::channel(args.buffer_capacity, args.notice_capacity);
    let store = Arc::new(FlowStore::new(args.raw_log_capacity));

    let whois = WhoisClient::new(Duration::from_secs(args.whois_timeout));
    // The resolver thread is detached: an in-flight lookup ends at its timeout
    let (resolver, _resolver_thread) =
        OwnerResolver::spawn(args.owner_queue, whois).context("Failed to start owner resolver")?;

    let poller = spawn_poller(consumer.clone(), Arc::clone(&store))
        .context("Failed to start ingest poller")?;

    // Launch TUI in separate thread if not headless
    let tui_handle: Option<JoinHandle<Result<()>>> = if args.headless {
        None
    } else {
        let options = LiveOptions { view: args.view, show_local: !args.hide_local };
        let tui_store = Arc::clone(&store);
        let tui_resolver = resolver.clone();
        let handle = std::thread::Builder::new()
            .name("tui".to_string())
            .spawn(move || tui::run_live(consumer, tui_store, tui_resolver, options))
            .context("Failed to start TUI thread")?;
        Some(handle)
    };

    if !quiet && args.headless {
        println!("headless: summary every {}s", args.summary_interval);
    }

    // Setup Ctrl+C handler
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let capture_start = Instant::now();
    let duration_limit =
        if args.duration > 0 { Some(Duration::from_secs(args.duration)) } else { None };
    let summary_interval = Duration::from_secs(args.summary_interval.max(1));
    let mut last_summary = Instant::now();

    // Track why we exited the loop
    let mut exit_reason = "interrupted";

    // Main capture loop
    loop {
        if let Some(limit) = duration_limit {
            if capture_start.elapsed() >= limit {
                exit_reason = "duration limit reached";
                break;
            }
        }

        if tui_handle.as_ref().is_some_and(JoinHandle::is_finished) {
            exit_reason = "dashboard closed";
            break;
        }

        if args.headless && last_summary.elapsed() >= summary_interval {
            display_summary(&store, producer.stats(), Some(&resolver));
            last_summary = Instant::now();
        }

        tokio::select! {
            guard = ring.readable_mut() => {
                let mut guard = guard.context("Failed to poll traffic ring buffer")?;
                let ring_buf = guard.get_inner_mut();
                // Hand every pending sample to the pipeline; it never blocks
                let mut closed = false;
                while let Some(item) = ring_buf.next() {
                    if producer.offer_raw(&item) == Offer::Closed {
                        closed = true;
                        break;
                    }
                }
                guard.clear_ready();
                if closed {
                    exit_reason = "pipeline closed";
                    break;
                }
            }
            () = tokio::time::sleep(HOUSEKEEPING_INTERVAL) => {}
            _ = &mut ctrl_c => {
                break;
            }
        }
    }

    // Closing the pipeline stops the poller and, once drained, the TUI
    let stats = Arc::clone(producer.stats());
    drop(producer);

    let tui_result = tui_handle.map(|handle| {
        handle.join().unwrap_or_else(|_| Err(anyhow::anyhow!("TUI thread panicked")))
    });

    match poller.join() {
        Ok(recorded) => debug!("Poller recorded {recorded} events"),
        Err(_) => warn!("Ingest poller panicked"),
    }

    if args.headless {
        display_summary(&store, &stats, Some(&resolver));
    }

    if !quiet || args.headless {
        let counts = store.counts();
        eprintln!(
            "\n{}: {:.1}s, {} events ({} accepted, {} dropped, {} malformed), {} flows",
            exit_reason,
            capture_start.elapsed().as_secs_f64(),
            counts.recorded,
            stats.accepted(),
            stats.dropped(),
            stats.malformed(),
            counts.flows,
        );
    }

    // Dropping `bpf` detaches both programs
    drop(bpf);

    tui_result.transpose()?;
    Ok(())
}
