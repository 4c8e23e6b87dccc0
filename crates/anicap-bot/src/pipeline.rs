//! The per-message job: parse → resolve → remux → upload.
//!
//! One job per incoming text message, fully independent of any other
//! in-flight job. The status message posted at the start is edited in
//! place as the job moves through its stages; any stage error ends the
//! job with a single "❌ Failed: …" edit carrying that error's text.
//! Nothing is retried.

use std::path::{Path, PathBuf};

use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId};
use thiserror::Error;

use anicap_core::episode::EpisodeUrlError;
use anicap_core::remux::{remux_to_mp4, RemuxError};
use anicap_core::resolver::ResolveError;
use anicap_core::EpisodeRef;

use crate::handlers::HandlerDeps;

const STATUS_FETCHING: &str = "⏳ Fetching stream URL…";
const STATUS_REMUXING: &str = "⏳ Downloading & remuxing…";
const STATUS_UPLOADING: &str = "🚀 Uploading to Telegram…";
const STATUS_DONE: &str = "✅ Done!";

/// Anything that can end a job. Stage errors are transparent so the
/// user-visible failure line carries the stage's own message.
#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    Url(#[from] EpisodeUrlError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Remux(#[from] RemuxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Deterministic output location: `{download_dir}/{slug}_{episode}.mp4`.
///
/// Concurrent jobs for the same episode share this path; the later one
/// silently overwrites the earlier file.
pub fn output_path(download_dir: &Path, episode: &EpisodeRef) -> PathBuf {
    download_dir.join(episode.output_file_name())
}

/// The single user-visible failure line.
pub fn failure_text(err: &JobError) -> String {
    format!("❌ Failed: {}", err)
}

/// The status message posted at job start, edited in place per stage.
struct StatusMessage<'a> {
    bot: &'a Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl StatusMessage<'_> {
    async fn set(&self, text: &str) -> Result<(), teloxide::RequestError> {
        self.bot.edit_message_text(self.chat_id, self.message_id, text).await?;
        Ok(())
    }
}

/// Handles one incoming text message, treated as an episode URL.
///
/// Telegram errors while posting the initial status message propagate to
/// the dispatcher; everything after that is reported to the user through
/// the status edit.
pub async fn handle_episode_message(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), teloxide::RequestError> {
    let text = msg.text().unwrap_or_default().trim().to_string();
    let chat_id = msg.chat.id;
    log::info!("Received URL from chat {}: {}", chat_id, text);

    let sent = bot.send_message(chat_id, STATUS_FETCHING).await?;
    let status = StatusMessage {
        bot: &bot,
        chat_id,
        message_id: sent.id,
    };

    match run_job(&bot, &status, &deps, chat_id, &text).await {
        Ok(()) => {
            status.set(STATUS_DONE).await?;
        }
        Err(err) => {
            log::error!("Job failed for chat {}: {}", chat_id, err);
            status.set(&failure_text(&err)).await?;
        }
    }

    Ok(())
}

async fn run_job(
    bot: &Bot,
    status: &StatusMessage<'_>,
    deps: &HandlerDeps,
    chat_id: ChatId,
    episode_url: &str,
) -> Result<(), JobError> {
    let episode = EpisodeRef::parse(episode_url)?;
    let source = deps.resolver.resolve(&episode, &deps.config.resolve).await?;

    status.set(STATUS_REMUXING).await?;
    tokio::fs::create_dir_all(&deps.config.download_dir).await?;
    let out_file = output_path(&deps.config.download_dir, &episode);
    remux_to_mp4(&source.url, source.referer.as_deref(), &out_file).await?;

    status.set(STATUS_UPLOADING).await?;
    bot.send_video(chat_id, InputFile::file(out_file.clone())).await?;

    // The upload succeeded; the local copy has served its purpose.
    if let Err(e) = tokio::fs::remove_file(&out_file).await {
        log::warn!("Failed to remove {}: {}", out_file.display(), e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_path_for_steinsgate_example() {
        let episode = EpisodeRef::parse("https://hianime.to/watch/steinsgate-3/episode-230").unwrap();
        let path = output_path(Path::new("downloads"), &episode);
        assert_eq!(path, PathBuf::from("downloads/steinsgate-3_230.mp4"));
    }

    #[test]
    fn test_failure_text_carries_resolver_message() {
        let err = JobError::from(ResolveError::NoHlsSource);
        assert_eq!(failure_text(&err), "❌ Failed: no playable HLS stream found");
    }

    #[test]
    fn test_failure_text_carries_parse_message() {
        let err = JobError::from(EpisodeUrlError::MissingSegments("https://hianime.to/watch".to_string()));
        let text = failure_text(&err);
        assert!(text.starts_with("❌ Failed: "));
        assert!(text.contains("https://hianime.to/watch"));
    }

    #[test]
    fn test_stage_errors_are_transparent() {
        let inner = ResolveError::NoHlsSource.to_string();
        let job = JobError::Resolve(ResolveError::NoHlsSource).to_string();
        assert_eq!(inner, job);
    }
}
