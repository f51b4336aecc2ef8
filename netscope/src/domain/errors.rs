//! Structured error types for netscope
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to load eBPF object {path}: {source}")]
    EbpfLoadFailed {
        path: PathBuf,
        #[source]
        source: aya::EbpfError,
    },

    #[error("eBPF program {0} not found in object")]
    ProgramNotFound(&'static str),

    #[error("eBPF map {0} not found in object")]
    MapNotFound(&'static str),

    #[error("Failed to attach {program} to cgroup {cgroup}: {error}")]
    AttachFailed { program: &'static str, cgroup: PathBuf, error: String },

    #[error("Failed to open cgroup {path}: {source}")]
    CgroupOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Program(#[from] aya::programs::ProgramError),

    #[error(transparent)]
    Map(#[from] aya::maps::MapError),
}

/// A ring-buffer record that couldn't be turned into an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Truncated traffic record: {len} bytes, expected {expected}")]
    Truncated { len: usize, expected: usize },

    #[error("Invalid direction byte: 0x{0:02x}")]
    InvalidDirection(u8),
}

/// Directory (whois) lookup failure
///
/// The Display text of this error is what ends up cached as the "owner"
/// of an address when a lookup fails, so it is kept short.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("whois: cannot resolve {server}")]
    Resolve { server: String },

    #[error("whois: connect to {server} failed: {source}")]
    Connect {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("whois: {0}")]
    Io(#[from] std::io::Error),

    #[error("whois: empty response from {0}")]
    EmptyResponse(String),

    #[error("whois: no answer within {timeout:?}")]
    Timeout { timeout: std::time::Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::Truncated { len: 12, expected: 66 };
        assert_eq!(err.to_string(), "Truncated traffic record: 12 bytes, expected 66");
        assert_eq!(DecodeError::InvalidDirection(0x78).to_string(), "Invalid direction byte: 0x78");
    }

    #[test]
    fn test_attach_error() {
        let err = CaptureError::AttachFailed {
            program: "monitor_ingress",
            cgroup: PathBuf::from("/sys/fs/cgroup"),
            error: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("monitor_ingress"));
        assert!(err.to_string().contains("/sys/fs/cgroup"));
    }

    #[test]
    fn test_lookup_error_is_short() {
        let err = LookupError::EmptyResponse("whois.arin.net".to_string());
        assert_eq!(err.to_string(), "whois: empty response from whois.arin.net");

        let err = LookupError::Timeout { timeout: std::time::Duration::from_secs(5) };
        assert_eq!(err.to_string(), "whois: no answer within 5s");
    }
}
