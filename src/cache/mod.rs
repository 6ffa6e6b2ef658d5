use crate::redis_client::RedisClient;
use redis::AsyncCommands;
use tracing::info;

pub mod search;
pub mod theaters;

/// Кеш ответов каталога в Redis. Схемы залов сюда не попадают, поэтому
/// смена доступности мест кеш не инвалидирует; любые правки админом - да.
#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
}

impl CacheService {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    /// Сбросить все закешированные ответы каталога.
    pub async fn invalidate_catalog(&self) {
        let mut conn = self.redis.conn.clone();
        let _: Result<(), _> = conn.del(theaters::THEATERS_KEY).await;

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(format!("{}*", search::SEARCH_PREFIX))
            .query_async(&mut conn)
            .await
            .unwrap_or_default();

        if !keys.is_empty() {
            let mut pipe = redis::pipe();
            for key in &keys {
                pipe.del(key);
            }
            let _: Result<(), _> = pipe.query_async(&mut conn).await;
        }
        info!("Invalidated catalog cache ({} search entries)", keys.len());
    }
}
