//! Bot initialization and command registration.

use std::time::Duration;

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use anicap_core::Config;

/// Request timeout for Telegram API calls. Generous because a single
/// send_video of a multi-GB file through a local Bot API server counts as
/// one request.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(900);

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "I can:")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
}

/// Text sent in reply to /start
pub const START_TEXT: &str =
    "👋 Hi! Send me a Hianime.to episode URL and I'll download it and send you the MP4 (up to 2 GB).";

/// Creates a Bot instance from the resolved configuration.
///
/// When `BOT_API_URL` is configured the bot talks to a local Bot API
/// server instead of api.telegram.org, which lifts the 50 MB upload cap.
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(UPLOAD_TIMEOUT).build()?;
    let bot = Bot::with_client(config.bot_token.clone(), client);

    Ok(match &config.bot_api_url {
        Some(api_url) => {
            log::info!("Using custom Bot API URL: {}", api_url);
            bot.set_api_url(api_url.clone())
        }
        None => bot,
    })
}

/// Registers the command list in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let descriptions = format!("{}", Command::descriptions());
        assert!(descriptions.contains("I can:"));
        assert!(descriptions.contains("start"));
    }
}
