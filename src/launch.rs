use crate::error::{Result, WrapperError};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Run an entry file under node with inherited stdio and report the child's
/// exit code. A signal-terminated child maps to exit code 1.
pub async fn run_entry(entry: &Path, args: &[String]) -> Result<i32> {
    let node = which::which("node")
        .map_err(|e| WrapperError::ExecutionFailed(format!("node runtime not found: {e}")))?;

    debug!("Launching {} with args {:?}", entry.display(), args);
    let status = Command::new(node)
        .arg(entry)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| {
            WrapperError::ExecutionFailed(format!(
                "Failed to launch {}: {}",
                entry.display(),
                e
            ))
        })?;

    Ok(status.code().unwrap_or(1))
}
