//! Command-line interface for netscope

pub mod args;

pub use args::Args;
