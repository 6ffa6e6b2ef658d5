use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::store::PgTheaterStore;

/// Пул PostgreSQL, в котором лежат документы кинотеатров.
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;
        info!("Database pool ready ({} connections max)", config.pool_size);

        Ok(Database { pool })
    }

    /// Таблица `theaters` с документом JSONB и индексом по городу.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running theater catalog migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }

    pub fn theater_store(&self) -> PgTheaterStore {
        PgTheaterStore::new(self.pool.clone())
    }
}
