//! Discord bot core logic and event handling.

use std::sync::Arc;

use log::{debug, info};
use poise::{
    Framework, FrameworkOptions, PrefixFrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents, Message, UserId},
};

use crate::annotate::LexiconAnnotator;
use crate::cache::RedisCache;
use crate::commands::bot_commands;
use crate::config::Config;
use crate::error::Result;
use crate::gemini::GeminiClient;
use crate::responder::Responder;
use crate::types::ChatId;

/// Discord rejects messages longer than this many characters.
const DISCORD_MESSAGE_LIMIT: usize = 2000;

const COMMAND_PREFIX: &str = "/";

pub struct Data {
    pub(crate) responder: Responder,
}

/// Run the Discord bot.
///
/// # Errors
///
/// Returns an error if configuration is missing or invalid, or if the Discord
/// client fails to start.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing Gemini client");
    let generator = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_base_url.clone(),
    );

    debug!(
        "Initializing Redis cache at {}:{}",
        config.redis_host, config.redis_port
    );
    let cache = RedisCache::new(&config.redis_url())?;

    let responder = Responder::new(
        Arc::new(cache),
        Arc::new(generator),
        Arc::new(LexiconAnnotator),
    );

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: bot_commands(),
            prefix_options: PrefixFrameworkOptions {
                prefix: Some(COMMAND_PREFIX.to_string()),
                mention_as_prefix: false,
                ..Default::default()
            },
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                Ok(Data { responder })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> Result<()> {
    if let FullEvent::Message { new_message } = event {
        let bot_user_id = ctx.cache.current_user().id;
        handle_message(ctx, new_message, data, bot_user_id).await?;
    }
    Ok(())
}

async fn handle_message(
    ctx: &Context,
    new_message: &Message,
    data: &Data,
    bot_user_id: UserId,
) -> Result<()> {
    if new_message.author.bot {
        return Ok(());
    }

    let is_direct = new_message.guild_id.is_none();
    let Some(text) = message_text(&new_message.content, is_direct, bot_user_id) else {
        return Ok(());
    };

    let chat = ChatId::from(new_message.channel_id);
    info!(
        "User {} ({chat}) sent: {text}",
        new_message.author.tag()
    );

    if let Err(e) = new_message.channel_id.broadcast_typing(&ctx.http).await {
        debug!("Failed to broadcast typing indicator: {e}");
    }

    let reply = data.responder.reply(chat, &text).await;
    info!("Reply to chat {chat}: {reply}");

    let mut chunks = split_message(&reply, DISCORD_MESSAGE_LIMIT).into_iter();
    if let Some(first) = chunks.next() {
        new_message.reply(&ctx.http, first).await?;
    }
    for chunk in chunks {
        new_message.channel_id.say(&ctx.http, chunk).await?;
    }

    Ok(())
}

/// The text the bot should answer, if any.
///
/// Direct messages are answered as-is. In servers the bot only answers when
/// mentioned, and the mention is removed from the text. Command invocations
/// are left to the command framework.
fn message_text(content: &str, is_direct: bool, bot_user_id: UserId) -> Option<String> {
    let content = content.trim();
    if content.starts_with(COMMAND_PREFIX) {
        return None;
    }

    let text = if is_direct {
        content.to_string()
    } else {
        let mention = format!("<@{bot_user_id}>");
        let nick_mention = format!("<@!{bot_user_id}>");
        if !content.contains(&mention) && !content.contains(&nick_mention) {
            return None;
        }
        content
            .replace(&nick_mention, "")
            .replace(&mention, "")
            .trim()
            .to_string()
    };

    if text.is_empty() || text.starts_with(COMMAND_PREFIX) {
        None
    } else {
        Some(text)
    }
}

/// Split `text` into pieces of at most `limit` characters, preferring line
/// breaks, then spaces.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        let hard = rest
            .char_indices()
            .nth(limit)
            .map_or(rest.len(), |(idx, _)| idx);
        let window = &rest[..hard];
        let cut = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&idx| idx > 0)
            .unwrap_or(hard);

        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start_matches(['\n', ' ']);
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}
