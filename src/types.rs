//! Common types used throughout the geminibot bot.

use std::fmt;

use poise::serenity_prelude::ChannelId;
use serde::{Deserialize, Serialize};

/// Role of a record in a chat's conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageRole {
    /// Message from the human user
    User,
    /// Reply produced by the model
    Assistant,
}

/// Identifier of the chat a message arrived in.
///
/// History is tracked per chat, so two users in the same channel share one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub u64);

impl From<ChannelId> for ChatId {
    fn from(channel_id: ChannelId) -> Self {
        ChatId(channel_id.get())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
