//! Turns an incoming chat message into reply text.

use std::sync::Arc;

use log::{error, info, warn};

use crate::annotate::TextAnnotator;
use crate::cache::{RESPONSE_TTL, ResponseCache};
use crate::error::{BotError, Result};
use crate::gemini::TextGenerator;
use crate::history::ConversationStore;
use crate::types::{ChatId, MessageRole};

/// Cache lookup, annotation and generation for one message at a time.
///
/// The cache is keyed by the exact message text and shared by every chat, so
/// two users sending identical text get the same cached answer. The history
/// records model replies only and is not fed back into prompts.
pub struct Responder {
    cache: Arc<dyn ResponseCache>,
    generator: Arc<dyn TextGenerator>,
    annotator: Arc<dyn TextAnnotator>,
    history: ConversationStore,
}

impl Responder {
    #[must_use]
    pub fn new(
        cache: Arc<dyn ResponseCache>,
        generator: Arc<dyn TextGenerator>,
        annotator: Arc<dyn TextAnnotator>,
    ) -> Self {
        Self {
            cache,
            generator,
            annotator,
            history: ConversationStore::new(),
        }
    }

    #[must_use]
    pub fn history(&self) -> &ConversationStore {
        &self.history
    }

    /// Produce the reply for `text`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EmptyGeneration`] when the model's text is empty or
    /// whitespace only, since Discord rejects blank messages. Any cache,
    /// annotation, or generation failure is returned as is.
    pub async fn respond(&self, chat: ChatId, text: &str) -> Result<String> {
        if let Some(cached) = self.cache.get(text).await? {
            info!("Cache hit for chat {chat}");
            return Ok(cached);
        }
        info!("Cache miss for chat {chat}");

        let annotation = self.annotator.annotate(text)?;
        info!("Sentiment for chat {chat}: {}", annotation.sentiment);
        if !annotation.entities.is_empty() {
            info!("Entities for chat {chat}: {}", annotation.entities);
        }

        let generated = self.generator.generate(text).await?;
        if generated.trim().is_empty() {
            return Err(BotError::EmptyGeneration);
        }

        self.cache.set_ex(text, &generated, RESPONSE_TTL).await?;
        self.history
            .append(chat, MessageRole::Assistant, generated.as_str())
            .await;

        let mut reply = generated;
        reply.push_str(&annotation.entities.render_appendage());
        Ok(reply)
    }

    /// Like [`Responder::respond`], but every failure becomes its fixed user-facing text.
    pub async fn reply(&self, chat: ChatId, text: &str) -> String {
        match self.respond(chat, text).await {
            Ok(reply) => reply,
            Err(BotError::EmptyGeneration) => {
                warn!("Gemini returned an empty response for chat {chat}");
                BotError::EmptyGeneration.user_message().to_string()
            }
            Err(e) => {
                error!("Error answering chat {chat}: {e}");
                e.user_message().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use tokio::time::Instant;

    use super::*;
    use crate::annotate::{Annotation, LexiconAnnotator};
    use crate::error::{EMPTY_GENERATION_REPLY, GENERIC_FAILURE_REPLY};

    /// In-memory cache that expires entries on tokio's clock.
    #[derive(Default)]
    struct MemoryCache {
        entries: Mutex<HashMap<String, (String, Instant)>>,
        fail: bool,
    }

    impl MemoryCache {
        async fn contains(&self, key: &str) -> bool {
            self.get(key).await.ok().flatten().is_some()
        }
    }

    #[async_trait]
    impl ResponseCache for MemoryCache {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail {
                return Err(BotError::Cache(redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "connection refused",
                ))));
            }
            let entries = self.entries.lock().await;
            Ok(entries
                .get(key)
                .filter(|(_, expires_at)| Instant::now() < *expires_at)
                .map(|(value, _)| value.clone()))
        }

        async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
            self.entries
                .lock()
                .await
                .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
            Ok(())
        }
    }

    enum Script {
        /// Reply tagged with the call number and prompt.
        Echo(String),
        /// Reply returned as-is.
        Exact(String),
        ApiError,
        Blocked,
    }

    /// Generator that answers from a script and counts calls.
    struct ScriptedGenerator {
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn with(script: Script) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
            }
        }

        fn replying(reply: &str) -> Self {
            Self::with(Script::Echo(reply.to_string()))
        }

        fn failing() -> Self {
            Self::with(Script::ApiError)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match &self.script {
                Script::Echo(reply) if reply.is_empty() => Ok(String::new()),
                Script::Echo(reply) => Ok(format!("{reply} #{call} ({prompt})")),
                Script::Exact(reply) => Ok(reply.clone()),
                Script::ApiError => Err(BotError::GeminiApi {
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                    message: "overloaded".to_string(),
                }),
                Script::Blocked => Err(BotError::GeminiResponse(
                    "Prompt blocked: SAFETY".to_string(),
                )),
            }
        }
    }

    struct BrokenAnnotator;

    impl TextAnnotator for BrokenAnnotator {
        fn annotate(&self, _text: &str) -> Result<Annotation> {
            Err(BotError::Annotation("model not loaded".to_string()))
        }
    }

    fn responder(
        cache: &Arc<MemoryCache>,
        generator: &Arc<ScriptedGenerator>,
    ) -> Responder {
        Responder::new(cache.clone(), generator.clone(), Arc::new(LexiconAnnotator))
    }

    #[tokio::test]
    async fn repeated_text_is_served_from_cache() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::replying("Glad to hear it"));
        let responder = responder(&cache, &generator);

        let first = responder
            .respond(ChatId(1), "I love this!")
            .await
            .expect("first reply");
        assert_eq!(first, "Glad to hear it #1 (I love this!)");
        assert!(cache.contains("I love this!").await);

        let second = responder
            .respond(ChatId(1), "I love this!")
            .await
            .expect("second reply");
        assert_eq!(second, first);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn cache_is_shared_across_chats() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::replying("answer"));
        let responder = responder(&cache, &generator);

        let first = responder.reply(ChatId(1), "what is rust").await;
        let other_chat = responder.reply(ChatId(2), "what is rust").await;

        assert_eq!(first, other_chat);
        assert_eq!(generator.calls(), 1);
        assert!(!responder.history().contains(ChatId(2)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_triggers_fresh_generation() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::replying("answer"));
        let responder = responder(&cache, &generator);

        let first = responder.reply(ChatId(1), "hello").await;
        tokio::time::advance(RESPONSE_TTL - Duration::from_secs(1)).await;
        assert_eq!(responder.reply(ChatId(1), "hello").await, first);
        assert_eq!(generator.calls(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        let refreshed = responder.reply(ChatId(1), "hello").await;
        assert_eq!(generator.calls(), 2);
        assert_ne!(refreshed, first);
    }

    #[tokio::test]
    async fn empty_generation_returns_fallback_without_caching() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::replying(""));
        let responder = responder(&cache, &generator);

        let result = responder.respond(ChatId(1), "hello").await;
        assert!(matches!(result, Err(BotError::EmptyGeneration)));
        assert_eq!(
            responder.reply(ChatId(1), "hello").await,
            EMPTY_GENERATION_REPLY
        );
        assert!(!cache.contains("hello").await);
        assert!(!responder.history().contains(ChatId(1)).await);
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn whitespace_only_generation_counts_as_empty() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::with(Script::Exact(" \n\t ".to_string())));
        let responder = responder(&cache, &generator);

        assert_eq!(
            responder.reply(ChatId(1), "hello").await,
            EMPTY_GENERATION_REPLY
        );
        assert!(!cache.contains("hello").await);
        assert!(!responder.history().contains(ChatId(1)).await);
    }

    #[tokio::test]
    async fn blocked_generation_returns_generic_fallback() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::with(Script::Blocked));
        let responder = responder(&cache, &generator);

        let result = responder.respond(ChatId(1), "hello").await;
        assert!(matches!(result, Err(BotError::GeminiResponse(_))));
        assert_eq!(
            responder.reply(ChatId(1), "hello").await,
            GENERIC_FAILURE_REPLY
        );
        assert!(!cache.contains("hello").await);
        assert!(!responder.history().contains(ChatId(1)).await);
    }

    #[tokio::test]
    async fn generation_failure_returns_generic_fallback() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::failing());
        let responder = responder(&cache, &generator);

        assert_eq!(
            responder.reply(ChatId(1), "hello").await,
            GENERIC_FAILURE_REPLY
        );
        assert!(!cache.contains("hello").await);
    }

    #[tokio::test]
    async fn cache_failure_returns_generic_fallback() {
        let cache = Arc::new(MemoryCache {
            fail: true,
            ..MemoryCache::default()
        });
        let generator = Arc::new(ScriptedGenerator::replying("answer"));
        let responder = responder(&cache, &generator);

        assert_eq!(
            responder.reply(ChatId(1), "hello").await,
            GENERIC_FAILURE_REPLY
        );
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn annotation_failure_discards_the_message() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::replying("answer"));
        let responder = Responder::new(cache.clone(), generator.clone(), Arc::new(BrokenAnnotator));

        assert_eq!(
            responder.reply(ChatId(1), "hello").await,
            GENERIC_FAILURE_REPLY
        );
        assert_eq!(generator.calls(), 0);
        assert!(!cache.contains("hello").await);
    }

    #[tokio::test]
    async fn entities_are_appended_but_not_cached() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::replying("Lovely city"));
        let responder = responder(&cache, &generator);
        let text = "Have you been to Paris?";

        let reply = responder.reply(ChatId(1), text).await;
        assert_eq!(
            reply,
            "Lovely city #1 (Have you been to Paris?)\n\n🔎 Entities: GPE: Paris"
        );

        let cached = cache
            .get(text)
            .await
            .expect("cache get")
            .expect("entry written");
        assert_eq!(cached, "Lovely city #1 (Have you been to Paris?)");
    }

    #[tokio::test]
    async fn entity_free_text_has_no_appendage() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::replying("sure"));
        let responder = responder(&cache, &generator);

        let reply = responder.reply(ChatId(1), "tell me a joke").await;
        assert_eq!(reply, "sure #1 (tell me a joke)");
        assert!(!reply.contains("Entities"));
    }

    #[tokio::test]
    async fn only_generated_replies_enter_history() {
        let cache = Arc::new(MemoryCache::default());
        let generator = Arc::new(ScriptedGenerator::replying("hi"));
        let responder = responder(&cache, &generator);

        responder.reply(ChatId(9), "hello").await;
        responder.reply(ChatId(9), "hello").await;

        let entries = responder.history().entries(ChatId(9)).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].role, MessageRole::Assistant);
        assert_eq!(entries[0].content, "hi #1 (hello)");
    }
}
