//! Reply cache shared by every chat, backed by Redis.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::OnceCell;

use crate::error::Result;

/// How long a generated reply stays cached.
pub const RESPONSE_TTL: Duration = Duration::from_secs(3600);

/// Key-value store for generated replies.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Fetch the value stored under `key`, if it has not expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key` for `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

/// Redis-backed cache using `GET` and `SETEX`.
///
/// The connection is opened on first use so the bot starts even if Redis is
/// down; every failed lookup then surfaces as a [`crate::error::BotError::Cache`].
pub struct RedisCache {
    client: redis::Client,
    connection: OnceCell<MultiplexedConnection>,
}

impl RedisCache {
    /// Create a cache for the given `redis://` URL without connecting yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                let connection = self.client.get_multiplexed_async_connection().await?;
                info!("Connected to Redis");
                Ok::<_, redis::RedisError>(connection)
            })
            .await?;
        Ok(connection.clone())
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection().await?;
        let value: Option<String> = connection.get(key).await?;
        debug!("Redis GET ({} byte key): hit={}", key.len(), value.is_some());
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut connection = self.connection().await?;
        let () = connection.set_ex(key, value, ttl.as_secs()).await?;
        debug!("Redis SETEX ({} byte key) for {}s", key.len(), ttl.as_secs());
        Ok(())
    }
}
