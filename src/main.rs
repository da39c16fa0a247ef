use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use userinfo_backend::{
    AppState,
    cache::{Cache, MemoryCache, RedisCache},
    config::{CacheBackend, Config},
    database::{PgUserInfoRepository, UserInfo},
    managers::UserInfoManager,
    middleware::log_errors,
    routes,
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'userinfo_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 根据配置选择缓存后端
    let cache: Arc<dyn Cache<Vec<UserInfo>>> = match config.cache_backend {
        CacheBackend::Redis => {
            let redis_url = config
                .redis_url
                .clone()
                .expect("REDIS_URL is required for the redis cache backend");
            let client =
                redis::Client::open(redis_url).expect("Failed to create Redis client");
            tracing::info!("Using redis cache backend");
            Arc::new(RedisCache::new(Arc::new(client)))
        }
        CacheBackend::Memory => {
            tracing::info!("Using in-memory cache backend");
            Arc::new(MemoryCache::new())
        }
    };

    // 组装管理器和应用状态
    let repository = Arc::new(PgUserInfoRepository::new(pool));
    let manager = Arc::new(UserInfoManager::new(
        repository,
        cache,
        config.cache_options(),
    ));
    let state = AppState { manager };

    let router = Router::new()
        .route(
            "/api/UserInfo",
            get(routes::user_info::get_user_info).post(routes::user_info::add_user_info),
        )
        .route(
            "/api/UserInfo/{id}",
            put(routes::user_info::update_user_info).delete(routes::user_info::delete_user_info),
        );

    // 添加日志中间件
    let router = router.layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 添加应用状态
    let app = router.with_state(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
