//! `/start`, `/help` and `/clear`, as prefix and slash commands.

use log::info;

use crate::bot::Data;
use crate::error::{BotError, Result};
use crate::history::ConversationStore;
use crate::types::ChatId;

/// Context type for bot commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

pub const START_TEXT: &str = "🤖 Hello! I'm a chatbot powered by **Google Gemini AI**.\n\
    You can chat with me by sending messages.\n\n\
    Use **/help** to see available commands!";

pub const HELP_TEXT: &str = "**Available Commands:**\n\
    ✅ /start - Start the bot\n\
    ✅ /help - Get help and command list\n\
    ✅ /clear - Clear chat history\n\n\
    Just type your message, and I'll respond! 😊";

pub const CLEAR_TEXT: &str = "✅ Chat history cleared! You can start fresh.";

/// Drop a chat's history. The confirmation is the same whether or not there was any.
pub async fn clear_history(history: &ConversationStore, chat: ChatId) -> &'static str {
    if history.clear(chat).await {
        info!("Cleared history for chat {chat}");
    }
    CLEAR_TEXT
}

/// Start the bot.
#[poise::command(prefix_command, slash_command)]
pub async fn start(ctx: Context<'_>) -> Result<()> {
    ctx.say(START_TEXT).await?;
    Ok(())
}

/// Get help and command list.
#[poise::command(prefix_command, slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<()> {
    ctx.say(HELP_TEXT).await?;
    Ok(())
}

/// Clear chat history.
#[poise::command(prefix_command, slash_command)]
pub async fn clear(ctx: Context<'_>) -> Result<()> {
    let chat = ChatId::from(ctx.channel_id());
    let text = clear_history(ctx.data().responder.history(), chat).await;
    ctx.say(text).await?;
    Ok(())
}

/// Get all bot commands.
#[must_use]
pub fn bot_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![start(), help(), clear()]
}
