//! Prerequisite checks for the external tools the launchers shell out to.
//!
//! A probe is a typed precondition, not part of the server: `serve` never
//! touches these, only `build`, `dev`, and `check` do.

use std::fmt;
use std::io;
use tokio::process::Command;
use tracing::info;

use crate::errors::{Error, Result};

/// External tools required by the build and dev launchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Node,
    Npm,
}

impl Tool {
    pub const ALL: [Tool; 2] = [Tool::Node, Tool::Npm];

    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Node => "node",
            Tool::Npm => "npm",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Version string reported by a successful probe.
#[derive(Debug, Clone)]
pub struct ToolVersion {
    pub tool: Tool,
    pub version: String,
}

/// Probe a tool by running `<binary> --version`.
pub async fn probe(tool: Tool) -> Result<ToolVersion> {
    let version = probe_binary(tool.binary()).await?;
    Ok(ToolVersion { tool, version })
}

/// Probe every required tool, logging versions as they come back.
///
/// Fails on the first missing tool so the error names exactly what to install.
pub async fn check_all() -> Result<Vec<ToolVersion>> {
    let mut versions = Vec::with_capacity(Tool::ALL.len());
    for tool in Tool::ALL {
        let found = probe(tool).await?;
        info!("found {} {}", found.tool, found.version);
        versions.push(found);
    }
    Ok(versions)
}

async fn probe_binary(binary: &'static str) -> Result<String> {
    let output = Command::new(binary)
        .arg("--version")
        .output()
        .await
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::ToolMissing { tool: binary },
            _ => Error::Io(err),
        })?;

    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: binary,
            status: output.status,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_reports_tool_missing() {
        let result = probe_binary("previewctl-test-no-such-binary").await;

        assert!(matches!(
            result,
            Err(Error::ToolMissing {
                tool: "previewctl-test-no-such-binary"
            })
        ));
    }

    #[test]
    fn tools_display_as_their_binary_names() {
        assert_eq!(Tool::Node.to_string(), "node");
        assert_eq!(Tool::Npm.to_string(), "npm");
    }
}
