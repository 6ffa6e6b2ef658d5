//! Ограничение частоты попыток изменить места: фиксированное окно на адрес клиента.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::redis_client::RedisClient;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// `true`, если попытка укладывается в лимит. Каждый вызов считается попыткой.
    async fn allow(&self, client: &str) -> bool;
}

/// Счётчик в Redis: `SET NX EX` открывает окно, `INCR` считает попытки.
#[derive(Clone)]
pub struct RedisRateLimiter {
    redis: RedisClient,
    max_attempts: u32,
    window: Duration,
}

impl RedisRateLimiter {
    pub fn new(redis: RedisClient, max_attempts: u32, window: Duration) -> Self {
        Self { redis, max_attempts, window }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn allow(&self, client: &str) -> bool {
        let key = format!("ratelimit:seats:{}", client);
        let mut conn = self.redis.conn.clone();

        let result: Result<(u64,), redis::RedisError> = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("NX")
            .arg("EX")
            .arg(self.window.as_secs().max(1))
            .ignore()
            .incr(&key, 1)
            .query_async(&mut conn)
            .await;

        match result {
            Ok((count,)) => count <= u64::from(self.max_attempts),
            Err(e) => {
                // Redis недоступен: пропускаем запрос, а не блокируем бронирование.
                warn!("Rate limiter unavailable, allowing {}: {:?}", client, e);
                true
            }
        }
    }
}

/// То же окно в памяти процесса.
pub struct MemoryRateLimiter {
    max_attempts: u32,
    window: Duration,
    hits: Mutex<HashMap<String, (Instant, u32)>>,
}

impl MemoryRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn allow(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().await;
        hits.retain(|_, (opened, _)| now.duration_since(*opened) < self.window);

        let entry = hits.entry(client.to_string()).or_insert((now, 0));
        entry.1 += 1;
        entry.1 <= self.max_attempts
    }
}
