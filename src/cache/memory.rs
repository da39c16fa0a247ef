use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{Cache, CacheError, CacheOptions};

struct Entry<T> {
    value: T,
    options: CacheOptions,
    inserted_at: Instant,
    last_access: Instant,
}

impl<T> Entry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.inserted_at + self.options.absolute_expiration
            || now >= self.last_access + self.options.sliding_expiration
    }
}

/// 进程内缓存后端，条目自带过期元数据，读取时惰性淘汰
pub struct MemoryCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T> MemoryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> Cache<T> for MemoryCache<T> {
    async fn get(&self, key: &str) -> Result<Option<T>, CacheError> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.entry(key.to_string()) {
            MapEntry::Occupied(occupied) if occupied.get().is_expired(now) => {
                occupied.remove();
                Ok(None)
            }
            MapEntry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                // 命中时刷新滑动过期窗口
                entry.last_access = now;
                Ok(Some(entry.value.clone()))
            }
            MapEntry::Vacant(_) => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: T, options: CacheOptions) -> Result<(), CacheError> {
        let now = Instant::now();
        let entry = Entry {
            value,
            options,
            inserted_at: now,
            last_access: now,
        };

        self.entries.lock().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
