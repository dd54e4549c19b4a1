//! Blocking subprocess invocation shared by the tool wrappers.

use crate::error::ToolError;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Run `tool` to completion; a non-zero exit is an error.
///
/// `subject` is the image the call is about, used in error messages.
pub(super) fn run<I, S>(tool: &str, args: I, subject: &Path) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(tool);
    command.args(args).stdin(Stdio::null());
    debug!(?command, "running external tool");

    let output = command.output().map_err(|source| ToolError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            path: subject.to_path_buf(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}
