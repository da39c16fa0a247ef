use std::env;
use std::time::Duration;

use crate::cache::{CacheOptions, CachePriority};

/// 缓存后端选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub cache_backend: CacheBackend,
    pub cache_sliding_secs: u64,
    pub cache_absolute_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let cache_backend = match env::var("CACHE_BACKEND").as_deref() {
            Ok("redis") => CacheBackend::Redis,
            _ => CacheBackend::Memory,
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").ok(),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cache_backend,
            cache_sliding_secs: env::var("CACHE_SLIDING_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            cache_absolute_secs: env::var("CACHE_ABSOLUTE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86400),
        })
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions::new(
            Duration::from_secs(self.cache_sliding_secs),
            Duration::from_secs(self.cache_absolute_secs),
            CachePriority::Normal,
        )
    }
}
