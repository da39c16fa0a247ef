use std::time::Duration;

/// 缓存条目优先级提示，后端可以忽略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePriority {
    Low,
    Normal,
    High,
}

/// 缓存条目的过期策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// 滑动过期：超过该时长没有访问则失效
    pub sliding_expiration: Duration,
    /// 绝对过期：写入后超过该时长无条件失效
    pub absolute_expiration: Duration,
    pub priority: CachePriority,
}

impl CacheOptions {
    pub fn new(
        sliding_expiration: Duration,
        absolute_expiration: Duration,
        priority: CachePriority,
    ) -> Self {
        Self {
            sliding_expiration,
            absolute_expiration,
            priority,
        }
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(60),
            Duration::from_secs(24 * 3600),
            CachePriority::Normal,
        )
    }
}
