//! External binary tooling
//!
//! The patcher and packager drive the host platform's binary tools
//! (`install_name_tool`, `otool`, `lipo`). Their command-line contracts are
//! fixed; this module only wraps invocation and failure propagation behind
//! [`ToolRunner`] so tests can substitute a recording fake.

use std::ffi::OsString;
use std::io;
use std::process::Command;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed: {stderr}")]
    Failed { tool: String, stderr: String },
}

/// Runs external binary tools.
pub trait ToolRunner: std::fmt::Debug {
    /// Run a tool to completion, discarding stdout.
    fn run(&self, tool: &str, args: &[OsString]) -> Result<(), ToolError>;

    /// Run a tool to completion and capture its stdout.
    fn capture(&self, tool: &str, args: &[OsString]) -> Result<String, ToolError>;
}

/// Production runner: spawns the tool and propagates non-zero exits with
/// captured stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTools;

impl SystemTools {
    fn output(tool: &str, args: &[OsString]) -> Result<Vec<u8>, ToolError> {
        let output = Command::new(tool)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: tool.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ToolError::Failed {
                tool: tool.to_string(),
                stderr,
            });
        }

        Ok(output.stdout)
    }
}

impl ToolRunner for SystemTools {
    fn run(&self, tool: &str, args: &[OsString]) -> Result<(), ToolError> {
        Self::output(tool, args).map(|_| ())
    }

    fn capture(&self, tool: &str, args: &[OsString]) -> Result<String, ToolError> {
        let stdout = Self::output(tool, args)?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}
