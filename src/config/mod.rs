use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub catalog: CatalogConfig,
    pub features: FeatureFlags,
}

// Настройки приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    /// `json` или `pretty`
    pub log_format: String,
}

// Без DATABASE_URL каталог живёт в памяти процесса
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Без REDIS_URL: лимитер в памяти, кеш выключен
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_key: Option<String>,
}

// Лимит попыток изменить место с одного адреса
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Самое длинное окно проката нового фильма, в днях.
    pub max_window_days: u32,
}

// Feature flags для включения/выключения функциональности
#[derive(Debug, Clone)]
pub struct FeatureFlags {
    pub enable_auth: bool,
    pub enable_rate_limiting: bool,
    pub enable_cache: bool,
}

fn var_or(name: &'static str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value.parse().map_err(|_| ConfigError::Invalid { name, value })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", "8000")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "showtic=debug,tower_http=debug"),
                log_format: var_or("LOG_FORMAT", "pretty"),
            },
            database: match env::var("DATABASE_URL") {
                Ok(url) => Some(DatabaseConfig {
                    url,
                    pool_size: parse_var("DB_POOL_SIZE", "20")?,
                }),
                Err(_) => None,
            },
            redis: env::var("REDIS_URL").ok().map(|url| RedisConfig { url }),
            auth: AuthConfig {
                api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            },
            rate_limit: RateLimitConfig {
                max_attempts: parse_var("RATE_LIMIT_MAX_ATTEMPTS", "10")?,
                window_seconds: parse_var("RATE_LIMIT_WINDOW_SECONDS", "300")?,
            },
            catalog: CatalogConfig {
                max_window_days: parse_var("MAX_BOOKING_WINDOW_DAYS", "366")?,
            },
            features: FeatureFlags {
                enable_auth: parse_var("ENABLE_AUTH", "true")?,
                enable_rate_limiting: parse_var("ENABLE_RATE_LIMITING", "true")?,
                enable_cache: parse_var("ENABLE_CACHE", "true")?,
            },
        };

        if config.features.enable_auth && config.auth.api_key.is_none() {
            return Err(ConfigError::Missing("API_KEY"));
        }
        Ok(config)
    }

    /// Конфигурация для тестов и локального запуска без внешних сервисов.
    pub fn in_memory(api_key: &str) -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".into(),
                port: 0,
                environment: "test".into(),
                rust_log: "showtic=debug".into(),
                log_format: "pretty".into(),
            },
            database: None,
            redis: None,
            auth: AuthConfig { api_key: Some(api_key.to_string()) },
            rate_limit: RateLimitConfig { max_attempts: 10, window_seconds: 300 },
            catalog: CatalogConfig { max_window_days: 366 },
            features: FeatureFlags {
                enable_auth: true,
                enable_rate_limiting: true,
                enable_cache: false,
            },
        }
    }
}
