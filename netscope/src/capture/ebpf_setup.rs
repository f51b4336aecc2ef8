//! # eBPF Program Loading and Attachment
//!
//! Loads the compiled capture object and attaches its `cgroup_skb` programs
//! to a cgroup v2 directory.
//!
//! ## Functions
//!
//! - [`load_ebpf_program()`] - Load the BPF object from disk
//! - [`init_ebpf_logger()`] - Forward `aya-log` output to the `log` facade
//! - [`attach_cgroup_programs()`] - Attach ingress + egress programs
//! - [`take_traffic_ring()`] - Take ownership of the `TRAFFIC_RING` map
//!
//! Links live as long as the returned [`Ebpf`] handle; dropping it detaches
//! both programs.

use std::fs::File;
use std::path::Path;

use aya::{
    maps::{MapData, RingBuf},
    programs::{CgroupAttachMode, CgroupSkb, CgroupSkbAttachType},
    Ebpf,
};
use aya_log::EbpfLogger;
use log::{info, warn};
use netscope_common::{EGRESS_PROGRAM, INGRESS_PROGRAM, TRAFFIC_RING_MAP};

use crate::domain::CaptureError;

/// Load the eBPF object built by `cargo xtask build-ebpf`
///
/// # Errors
/// Returns an error if the object is missing or rejected by the kernel
pub fn load_ebpf_program(path: &Path) -> Result<Ebpf, CaptureError> {
    Ebpf::load_file(path)
        .map_err(|source| CaptureError::EbpfLoadFailed { path: path.to_path_buf(), source })
}

/// Forward the capture programs' `aya-log` records to the `log` facade
///
/// They log lost records at debug level, so `RUST_LOG=debug` surfaces them.
pub fn init_ebpf_logger(bpf: &mut Ebpf) {
    if let Err(e) = EbpfLogger::init(bpf) {
        warn!("Failed to initialize eBPF logger: {e}");
    }
}

fn attach_one(
    bpf: &mut Ebpf,
    name: &'static str,
    attach_type: CgroupSkbAttachType,
    cgroup: &Path,
    cgroup_file: &File,
) -> Result<(), CaptureError> {
    let program: &mut CgroupSkb =
        bpf.program_mut(name).ok_or(CaptureError::ProgramNotFound(name))?.try_into()?;
    program.load()?;
    program.attach(cgroup_file, attach_type, CgroupAttachMode::Single).map_err(|e| {
        CaptureError::AttachFailed { program: name, cgroup: cgroup.to_path_buf(), error: e.to_string() }
    })?;
    info!("✓ Attached {name} to {}", cgroup.display());
    Ok(())
}

/// Attach both capture programs to the cgroup at `cgroup`
///
/// # Errors
/// Returns an error if the cgroup can't be opened or either program fails to
/// load or attach
pub fn attach_cgroup_programs(bpf: &mut Ebpf, cgroup: &Path) -> Result<(), CaptureError> {
    let cgroup_file = File::open(cgroup)
        .map_err(|source| CaptureError::CgroupOpenFailed { path: cgroup.to_path_buf(), source })?;

    attach_one(bpf, INGRESS_PROGRAM, CgroupSkbAttachType::Ingress, cgroup, &cgroup_file)?;
    attach_one(bpf, EGRESS_PROGRAM, CgroupSkbAttachType::Egress, cgroup, &cgroup_file)?;
    Ok(())
}

/// Take the traffic ring buffer out of the loaded object
///
/// # Errors
/// Returns an error if the map is missing or isn't a ring buffer
pub fn take_traffic_ring(bpf: &mut Ebpf) -> Result<RingBuf<MapData>, CaptureError> {
    let map = bpf.take_map(TRAFFIC_RING_MAP).ok_or(CaptureError::MapNotFound(TRAFFIC_RING_MAP))?;
    Ok(RingBuf::try_from(map)?)
}
