use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{Cache, CacheError, CacheOptions};

/// 缓存值信封，附带绝对截止时间和滑动窗口长度
#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    value: T,
    absolute_deadline: i64,
    sliding_secs: u64,
}

/// Redis 缓存后端，值以 JSON 存储
pub struct RedisCache<T> {
    client: Arc<RedisClient>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RedisCache<T> {
    pub fn new(client: Arc<RedisClient>) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    /// TTL 取滑动窗口与剩余绝对时间的较小者，至少1秒
    fn ttl_secs(sliding_secs: u64, remaining_secs: u64) -> u64 {
        sliding_secs.min(remaining_secs).max(1)
    }
}

#[async_trait]
impl<T> Cache<T> for RedisCache<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get(&self, key: &str) -> Result<Option<T>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let raw: Option<String> = conn.get(key).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let envelope: Envelope<T> = serde_json::from_str(&raw)?;

        let remaining = envelope.absolute_deadline - Utc::now().timestamp();
        if remaining <= 0 {
            let _: () = conn.del(key).await?;
            return Ok(None);
        }

        // 命中时刷新滑动过期，但不越过绝对截止时间
        let ttl = Self::ttl_secs(envelope.sliding_secs, remaining as u64);
        let _: () = conn.expire(key, ttl as i64).await?;

        Ok(Some(envelope.value))
    }

    async fn set(&self, key: &str, value: T, options: CacheOptions) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let absolute_secs = options.absolute_expiration.as_secs();
        let envelope = Envelope {
            value,
            absolute_deadline: Utc::now().timestamp() + absolute_secs as i64,
            sliding_secs: options.sliding_expiration.as_secs(),
        };
        let json = serde_json::to_string(&envelope)?;

        let ttl = Self::ttl_secs(envelope.sliding_secs, absolute_secs);
        let _: () = conn.set_ex(key, json, ttl).await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let _: () = conn.del(key).await?;

        Ok(())
    }
}
