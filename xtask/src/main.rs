use anyhow::{Context, Result};
use clap::Parser;
use std::process::Command;

#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Parser)]
enum Cmd {
    /// Cross-compile the cgroup_skb capture programs
    BuildEbpf {
        #[arg(long, default_value = "bpfel-unknown-none")]
        target: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Cmd::BuildEbpf { target } => build_ebpf(&target)?,
    }

    Ok(())
}

fn build_ebpf(target: &str) -> Result<()> {
    // Debug builds of BPF objects pull in formatting code the BPF linker rejects,
    // so the object is always built with the release profile.
    let status = Command::new("cargo")
        .args(["+nightly", "build", "--package", "netscope-ebpf", "--target", target])
        .args(["-Z", "build-std=core", "--release"])
        .status()
        .context("Failed to run cargo for netscope-ebpf")?;

    if !status.success() {
        anyhow::bail!("Failed to build eBPF program");
    }

    println!("✓ eBPF object built: target/{target}/release/netscope");
    println!("  load it with: sudo netscope --bpf-object target/{target}/release/netscope");

    Ok(())
}
