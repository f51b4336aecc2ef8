//! Pre-flight checks for netscope
//!
//! Validates system requirements before attempting to load eBPF programs.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Minimum kernel version for the BPF ring buffer
const MIN_KERNEL_VERSION: (u32, u32) = (5, 8);

/// Run all pre-flight checks before eBPF loading
pub fn run_preflight_checks(cgroup: &Path) -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    check_cgroup(cgroup)?;
    Ok(())
}

/// Check if running with sufficient privileges for eBPF
fn check_privileges() -> Result<()> {
    if unsafe { libc::geteuid() } == 0 {
        return Ok(());
    }

    bail!(
        "Permission denied: netscope requires root privileges to load eBPF programs.\n\n\
         Run with: sudo netscope ..."
    );
}

/// Parse `major.minor` out of a release string like `6.1.0-arch1-1`
#[must_use]
pub fn parse_kernel_release(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor: String = parts.next()?.chars().take_while(char::is_ascii_digit).collect();
    Some((major, minor.parse().ok()?))
}

/// Check if the kernel version is sufficient for the ring buffer
fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    // "Linux version 5.15.0-generic ..."
    let release = version_str.split_whitespace().nth(2).unwrap_or("unknown");

    // Can't parse, assume it's fine
    let Some((major, minor)) = parse_kernel_release(release) else {
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {major}.{minor} is too old.\n\n\
             netscope requires Linux {}.{} or newer for eBPF ring buffer support.\n\
             Current kernel: {release}",
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
        );
    }

    Ok(())
}

/// Check the attach point is a cgroup v2 directory
fn check_cgroup(path: &Path) -> Result<()> {
    if !path.is_dir() {
        bail!(
            "cgroup not found: {}\n\n\
             --cgroup must point to a cgroup v2 directory, e.g. /sys/fs/cgroup",
            path.display()
        );
    }
    if !path.join("cgroup.controllers").exists() {
        bail!(
            "Not a cgroup v2 directory: {}\n\n\
             netscope attaches cgroup_skb programs, which need the unified hierarchy.\n\
             Check with: mount | grep cgroup2",
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kernel_release() {
        assert_eq!(parse_kernel_release("5.15.0-generic"), Some((5, 15)));
        assert_eq!(parse_kernel_release("6.1.0-arch1-1"), Some((6, 1)));
        assert_eq!(parse_kernel_release("6.8"), Some((6, 8)));
        assert_eq!(parse_kernel_release("4.19rc1"), Some((4, 19)));
        assert_eq!(parse_kernel_release("6"), None);
        assert_eq!(parse_kernel_release("unknown"), None);
        assert!(parse_kernel_release("5.4.0").unwrap() < MIN_KERNEL_VERSION);
    }

    #[test]
    fn test_kernel_version_check() {
        // Don't assert success since test might run on old kernel
        let _ = check_kernel_version();
    }

    #[test]
    fn test_cgroup_not_found() {
        let err = check_cgroup(Path::new("/nonexistent/cgroup")).unwrap_err().to_string();
        assert!(err.contains("cgroup not found"));
    }

    #[test]
    fn test_plain_directory_is_not_cgroup() {
        let err = check_cgroup(&std::env::temp_dir()).unwrap_err().to_string();
        assert!(err.contains("Not a cgroup v2 directory"));
    }
}
