// 缓存模块
// 包含缓存抽象和可插拔的缓存后端实现

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod options;
pub mod redis;

// 重新导出常用类型，方便其他模块使用
pub use self::memory::MemoryCache;
pub use self::options::{CacheOptions, CachePriority};
pub use self::redis::RedisCache;

/// 缓存键定义
pub mod keys {
    /// 用户信息列表的固定缓存键
    pub const USERINFO_LIST: &str = "USERINFO_LIST";
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 缓存抽象：后端可替换（进程内或外部缓存）
#[async_trait]
pub trait Cache<T>: Send + Sync {
    /// 按键读取，未命中返回 None
    async fn get(&self, key: &str) -> Result<Option<T>, CacheError>;

    /// 写入并覆盖已有条目
    async fn set(&self, key: &str, value: T, options: CacheOptions) -> Result<(), CacheError>;

    /// 删除条目，键不存在时为空操作
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}
