use crate::cache::CacheService;
use crate::models::TheaterSummary;
use redis::AsyncCommands;

pub const THEATERS_KEY: &str = "theaters";

impl CacheService {
    // Список кинотеатров из кеша; None при промахе или ошибке разбора
    pub async fn get_theaters(&self) -> Option<Vec<TheaterSummary>> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(THEATERS_KEY).await.ok().flatten();
        data.and_then(|d| serde_json::from_str(&d).ok())
    }

    pub async fn save_theaters(&self, theaters: &[TheaterSummary]) -> Result<(), redis::RedisError> {
        let data = serde_json::to_string(theaters).map_err(|_| {
            redis::RedisError::from((redis::ErrorKind::TypeError, "Serialize error"))
        })?;
        let mut conn = self.redis.conn.clone();
        conn.set_ex(THEATERS_KEY, data, 3600).await // 1 час
    }
}
