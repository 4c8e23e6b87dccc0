//! HLS → MP4 remux via ffmpeg.
//!
//! The stream's encoded payload is copied into an MP4 container without
//! re-encoding (`-c copy`). When the resolver supplied a Referer, it is
//! forwarded so the CDN authorizes the segment fetches. The ffmpeg exit
//! status is the sole success signal; there is no partial-file cleanup.

use std::ffi::OsString;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

use crate::process::{run_with_timeout, REMUX_TIMEOUT};

/// Errors that can occur during a remux run
#[derive(Error, Debug)]
pub enum RemuxError {
    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remux timed out after {0}s")]
    Timeout(u64),
}

pub type RemuxResult<T> = Result<T, RemuxError>;

/// Check if ffmpeg is available
pub async fn check_ffmpeg() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Build the ffmpeg argument vector for one remux run.
///
/// Split out so the Referer-forwarding contract is testable without
/// spawning ffmpeg: a supplied Referer becomes a `-headers` flag before
/// the input, absence means no header flag at all.
pub fn build_remux_args(stream_url: &str, referer: Option<&str>, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
    ];
    if let Some(referer) = referer {
        args.push("-headers".into());
        args.push(format!("Referer: {}\r\n", referer).into());
    }
    args.push("-i".into());
    args.push(stream_url.into());
    args.push("-c".into());
    args.push("copy".into());
    args.push(output.as_os_str().to_os_string());
    args
}

/// Remux an HLS stream into an MP4 file at `output`.
///
/// Blocks (asynchronously) until ffmpeg exits; non-zero exit surfaces the
/// captured stderr as `RemuxError::Ffmpeg`.
pub async fn remux_to_mp4(stream_url: &str, referer: Option<&str>, output: &Path) -> RemuxResult<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(build_remux_args(stream_url, referer, output));

    let result = run_with_timeout(&mut cmd, REMUX_TIMEOUT).await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        log::error!("FFmpeg remux error: {}", stderr);
        return Err(RemuxError::Ffmpeg(stderr.trim().to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_build_remux_args_without_referer() {
        let out = PathBuf::from("downloads/steinsgate-3_230.mp4");
        let args = build_remux_args("https://cdn/x.m3u8", None, &out);
        let args: Vec<String> = args.into_iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            vec![
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-i",
                "https://cdn/x.m3u8",
                "-c",
                "copy",
                "downloads/steinsgate-3_230.mp4",
            ]
        );
    }

    #[test]
    fn test_build_remux_args_with_referer() {
        let out = PathBuf::from("out.mp4");
        let args = build_remux_args("https://cdn/x.m3u8", Some("https://megacloud.tv/"), &out);
        let args: Vec<String> = args.into_iter().map(|a| a.to_string_lossy().into_owned()).collect();

        let headers_pos = args.iter().position(|a| a == "-headers").unwrap();
        assert_eq!(args[headers_pos + 1], "Referer: https://megacloud.tv/\r\n");

        // Header flag comes before the input so ffmpeg applies it to
        // segment fetches.
        let input_pos = args.iter().position(|a| a == "-i").unwrap();
        assert!(headers_pos < input_pos);
    }

    #[tokio::test]
    async fn test_remux_nonexistent_input_fails() {
        if !check_ffmpeg().await {
            return; // ffmpeg not installed in this environment
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.mp4");
        let err = remux_to_mp4("/definitely/not/a/real/input.m3u8", None, &out)
            .await
            .unwrap_err();
        assert!(matches!(err, RemuxError::Ffmpeg(_)));
    }
}
