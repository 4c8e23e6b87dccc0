//! Process execution utilities with timeout support
//!
//! Provides a helper for running external processes (ffmpeg) with a
//! bounded timeout so a hung process cannot block a job forever.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::remux::RemuxError;

/// Default timeout for a full remux run. HLS pulls of a whole episode are
/// slow, so this is generous; it only exists to bound a wedged ffmpeg.
pub const REMUX_TIMEOUT: Duration = Duration::from_secs(1800);

/// Run an async Command with a timeout.
///
/// Returns the process Output on success, or a `RemuxError` on timeout/IO
/// failure.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, RemuxError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(RemuxError::Io(e)),
        Err(_) => Err(RemuxError::Timeout(timeout.as_secs())),
    }
}
