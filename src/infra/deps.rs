use anyhow::{Result, bail};
use std::process::{Command, Stdio};

pub fn command_available(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Hard requirement checked before any workflow runs.
pub fn require_distrobox() -> Result<()> {
    if !command_available("distrobox") {
        bail!("'distrobox' not found in PATH. Install it before using boxkeeper.");
    }
    Ok(())
}

/// Picks the container runtime distrobox is backed by, podman first.
pub fn detect_runtime() -> Result<String> {
    for candidate in ["podman", "docker"] {
        if command_available(candidate) {
            return Ok(candidate.to_string());
        }
    }

    bail!("neither 'podman' nor 'docker' found in PATH. Distrobox requires one of them.")
}
