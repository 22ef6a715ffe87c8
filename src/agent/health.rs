// MOODTUNE Health Check
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Start-up check for the external tools the sensing path shells out to.

use std::process::{Command, Stdio};
use tracing::debug;

/// External executables the camera adapter depends on.
pub const REQUIRED_TOOLS: &[&str] = &["ffmpeg"];

/// Whether `tool -version` runs successfully.
pub fn tool_available(tool: &str) -> bool {
    match Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(e) => {
            debug!("[HEALTH] {} not runnable: {}", tool, e);
            false
        }
    }
}

/// Names of required tools that are missing from PATH.
pub fn check_dependencies() -> Vec<String> {
    REQUIRED_TOOLS
        .iter()
        .filter(|t| !tool_available(t))
        .map(|t| t.to_string())
        .collect()
}
