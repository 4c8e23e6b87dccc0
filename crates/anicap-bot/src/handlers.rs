//! Dispatcher schema and handler dependencies.

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use anicap_core::{Config, StreamResolver};

use crate::bot::{Command, START_TEXT};
use crate::pipeline::handle_episode_message;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers, built once at startup.
#[derive(Clone)]
pub struct HandlerDeps {
    pub config: Arc<Config>,
    pub resolver: Arc<StreamResolver>,
}

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same schema is used in production and in integration tests:
/// commands first, then every remaining text message is treated as an
/// episode URL.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps))
}

/// Handler for bot commands (/start)
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
            match cmd {
                Command::Start => {
                    bot.send_message(msg.chat.id, START_TEXT).await?;
                }
            }
            Ok(())
        },
    ))
}

/// Handler for plain text messages, each treated as an episode URL
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.text()
                .map(|text| !text.trim().is_empty() && !text.starts_with('/'))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                handle_episode_message(bot, msg, deps).await?;
                Ok(())
            }
        })
}
