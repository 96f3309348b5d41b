//! In-process conversation history, one entry per chat.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;
use tokio::sync::Mutex;

use crate::types::{ChatId, MessageRole};

/// One role-tagged record in a chat's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Per-chat conversation history.
///
/// Only model replies are recorded and nothing reads the history back into a
/// prompt; `/clear` drops a chat's entry wholesale. Lives for the process
/// lifetime only.
#[derive(Debug, Default)]
pub struct ConversationStore {
    chats: Mutex<HashMap<ChatId, Vec<HistoryEntry>>>,
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, chat: ChatId, role: MessageRole, content: impl Into<String>) {
        let mut chats = self.chats.lock().await;
        let entries = chats.entry(chat).or_default();
        entries.push(HistoryEntry {
            role,
            content: content.into(),
            created_at: Utc::now(),
        });
        debug!("Chat {chat} history now has {} entries", entries.len());
    }

    /// Remove a chat's history. Returns `true` if there was anything to remove.
    pub async fn clear(&self, chat: ChatId) -> bool {
        let Some(entries) = self.chats.lock().await.remove(&chat) else {
            debug!("Clear history for chat {chat}: nothing stored");
            return false;
        };
        if let Some(oldest) = entries.first() {
            debug!(
                "Cleared {} entries for chat {chat}, oldest from {}",
                entries.len(),
                oldest.created_at.to_rfc3339()
            );
        }
        true
    }

    /// Snapshot of a chat's history, oldest first.
    pub async fn entries(&self, chat: ChatId) -> Vec<HistoryEntry> {
        self.chats
            .lock()
            .await
            .get(&chat)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn contains(&self, chat: ChatId) -> bool {
        self.chats.lock().await.contains_key(&chat)
    }
}
