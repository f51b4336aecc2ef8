//! # eBPF Kernel-Side Capture
//!
//! `cgroup_skb` programs that observe every packet crossing the attached
//! cgroup and emit a [`TrafficRecord`] per packet. They never drop traffic:
//! both programs always return 1 (allow).
//!
//! ## Programs
//!
//! - **`monitor_ingress`** - `cgroup_skb/ingress`
//! - **`monitor_egress`** - `cgroup_skb/egress`
//!
//! ## Maps (Shared with Userspace)
//!
//! - `TRAFFIC_RING` - Ring buffer (16MB) for the packet stream
//!
//! Records that can't be read or queued are reported through `aya-log` at
//! debug level; userspace forwards them to the `log` facade.
//!
//! ## Build
//!
//! The xtask always builds this crate with the release profile:
//! ```bash
//! cargo xtask build-ebpf
//! ```

#![no_std]
#![no_main]
#![allow(unused_unsafe)]

use aya_ebpf::{
    macros::{cgroup_skb, map},
    maps::RingBuf,
    programs::SkBuffContext,
};
use aya_log_ebpf::debug;
use netscope_common::{
    TrafficRecord, AF_INET, AF_INET6, DIRECTION_EGRESS, DIRECTION_INGRESS, IPPROTO_TCP,
    IPPROTO_UDP,
};

// ============================================================================
// Constants
// ============================================================================

/// Ask the kernel to wake the userspace reader for every record
const BPF_RB_FORCE_WAKEUP: u64 = 2;

/// Fixed IPv6 header length (extension headers are not walked)
const IPV6_HDR_LEN: usize = 40;

/// Allow the packet through (cgroup_skb verdict)
const SK_PASS: i32 = 1;

// ============================================================================
// eBPF Maps
// ============================================================================

/// Ring buffer for sending packet records to userspace
///
/// - **Size**: 16MB
/// - **Overflow**: `output()` fails and the record is lost in-kernel
#[map]
static TRAFFIC_RING: RingBuf = RingBuf::with_byte_size(1 << 24, 0);

// ============================================================================
// eBPF Program Hooks
// ============================================================================

#[cgroup_skb(ingress)]
pub fn monitor_ingress(ctx: SkBuffContext) -> i32 {
    if let Err(code) = try_capture(&ctx, DIRECTION_INGRESS) {
        debug!(&ctx, "ingress record lost: {}", code);
    }
    SK_PASS
}

#[cgroup_skb(egress)]
pub fn monitor_egress(ctx: SkBuffContext) -> i32 {
    if let Err(code) = try_capture(&ctx, DIRECTION_EGRESS) {
        debug!(&ctx, "egress record lost: {}", code);
    }
    SK_PASS
}

fn try_capture(ctx: &SkBuffContext, direction: u8) -> Result<(), i64> {
    let skb = ctx.skb.skb;
    let family = unsafe { (*skb).family };

    let mut record = TrafficRecord::zeroed();
    record.direction = direction;
    record.family = family;
    record.pkttype = unsafe { (*skb).pkt_type };
    record.ifindex = unsafe { (*skb).ifindex };
    record.bytes = u64::from(ctx.len());

    // cgroup_skb data starts at the network header
    let transport_offset = match family {
        AF_INET => {
            let version_ihl: u8 = ctx.load(0)?;
            record.protocol = ctx.load(9)?;
            record.saddr = ctx.load(12)?;
            record.daddr = ctx.load(16)?;
            usize::from(version_ihl & 0x0f) * 4
        }
        AF_INET6 => {
            record.protocol = ctx.load(6)?;
            record.saddr_v6 = ctx.load(8)?;
            record.daddr_v6 = ctx.load(24)?;
            IPV6_HDR_LEN
        }
        _ => 0,
    };

    if transport_offset > 0 && (record.protocol == IPPROTO_TCP || record.protocol == IPPROTO_UDP)
    {
        // TCP and UDP both start with source port, destination port
        if let (Ok(sport), Ok(dport)) =
            (ctx.load::<u16>(transport_offset), ctx.load::<u16>(transport_offset + 2))
        {
            record.sport = u16::from_be(sport);
            record.dport = u16::from_be(dport);
        }
    }

    TRAFFIC_RING.output(&record, BPF_RB_FORCE_WAKEUP)?;
    Ok(())
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
