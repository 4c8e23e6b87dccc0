use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;

use anicap::bot::{create_bot, setup_bot_commands};
use anicap::handlers::{schema, HandlerDeps};
use anicap_core::{check_ffmpeg, Config, StreamResolver};

/// Main entry point for the Telegram bot.
///
/// # Errors
/// Returns an error if initialization fails (missing token, invalid
/// Bot API URL, HTTP client construction).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();
    pretty_env_logger::init();

    let config = Arc::new(Config::from_env()?);

    if !check_ffmpeg().await {
        log::warn!("ffmpeg not found on PATH — downloads will fail until it is installed");
    }

    let resolver = Arc::new(StreamResolver::new(config.api_base.clone())?);
    let bot = create_bot(&config)?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    log::info!(
        "Starting anicap (API base: {}, download dir: {})",
        config.api_base,
        config.download_dir.display()
    );

    let deps = HandlerDeps { config, resolver };

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
