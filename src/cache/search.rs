use crate::cache::CacheService;
use redis::AsyncCommands;

pub const SEARCH_PREFIX: &str = "search:theaters:";
pub const SEARCH_TTL_SECONDS: u64 = 3600;

/// Ключ кеша по параметрам поиска. Город и фильтры берутся как пришли.
pub fn search_key(city: &str, title: Option<&str>, language: Option<&str>, date: Option<&str>) -> String {
    format!(
        "{}city={}&title={}&language={}&date={}",
        SEARCH_PREFIX,
        city,
        title.unwrap_or_default(),
        language.unwrap_or_default(),
        date.unwrap_or_default()
    )
}

impl CacheService {
    /// Получает закешированный результат поиска по ключу.
    pub async fn get_cached_search(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        conn.get(key).await
    }

    /// Сохраняет результат поиска в кеш с указанным TTL (в секундах).
    pub async fn cache_search_result(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.conn.clone();
        conn.set_ex(key, value, ttl_seconds).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_distinguishes_missing_filters() {
        let plain = search_key("Chennai", None, None, None);
        let titled = search_key("Chennai", Some("Leo"), None, None);
        assert!(plain.starts_with(SEARCH_PREFIX));
        assert_ne!(plain, titled);
        assert_eq!(titled, "search:theaters:city=Chennai&title=Leo&language=&date=");
    }
}
