pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dates;
pub mod error;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;
pub mod store;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::cache::CacheService;
use crate::services::{Catalog, MemoryRateLimiter, RateLimiter, RedisRateLimiter};
use crate::store::{MemoryTheaterStore, TheaterStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    /// `None`, если кеш выключен или Redis не настроен.
    pub cache: Option<CacheService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub config: config::Config,
}

impl AppState {
    /// Подключает PostgreSQL и Redis, если они заданы в конфигурации; иначе
    /// каталог и лимитер работают в памяти процесса.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn TheaterStore> = match &config.database {
            Some(db_config) => {
                let db = database::Database::connect(db_config)
                    .await
                    .context("Failed to connect to database")?;
                db.run_migrations().await.context("Failed to run migrations")?;
                Arc::new(db.theater_store())
            }
            None => {
                warn!("DATABASE_URL not set, theater catalog is kept in memory");
                Arc::new(MemoryTheaterStore::new())
            }
        };

        let window = Duration::from_secs(config.rate_limit.window_seconds);
        let (cache, rate_limiter): (Option<CacheService>, Arc<dyn RateLimiter>) = match &config.redis {
            Some(redis_config) => {
                let redis = redis_client::RedisClient::new(&redis_config.url)
                    .await
                    .context("Failed to connect to Redis")?;
                info!("Redis connected");
                let cache = config
                    .features
                    .enable_cache
                    .then(|| CacheService::new(redis.clone()));
                let limiter = RedisRateLimiter::new(redis, config.rate_limit.max_attempts, window);
                (cache, Arc::new(limiter))
            }
            None => {
                warn!("REDIS_URL not set, rate limiting is per process and caching is off");
                let limiter = MemoryRateLimiter::new(config.rate_limit.max_attempts, window);
                (None, Arc::new(limiter))
            }
        };

        Ok(Arc::new(Self {
            catalog: Catalog::new(store).with_max_window_days(config.catalog.max_window_days),
            cache,
            rate_limiter,
            config,
        }))
    }

    /// Состояние без внешних сервисов: каталог и лимитер в памяти, без кеша.
    pub fn in_memory(config: config::Config) -> Arc<Self> {
        let window = Duration::from_secs(config.rate_limit.window_seconds);
        Arc::new(Self {
            catalog: Catalog::new(Arc::new(MemoryTheaterStore::new()))
                .with_max_window_days(config.catalog.max_window_days),
            cache: None,
            rate_limiter: Arc::new(MemoryRateLimiter::new(config.rate_limit.max_attempts, window)),
            config,
        })
    }
}

/// Полный роутер приложения.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Json("Welcome to ShoreTic API") }))
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .merge(controllers::routes(state.clone()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
