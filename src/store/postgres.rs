use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use tracing::debug;

use super::{SeatLocation, StoreError, TheaterDetails, TheaterStore};
use crate::models::{Location, Movie, SeatRow, Theater, TheaterSummary};

/// Условная запись флага места: `$1` id, `$2` путь к флагу, `$3` значение,
/// далее пары (путь к ключу, ожидаемый ключ) начиная с `$4`.
fn seat_update_sql(guard_count: usize) -> String {
    let mut sql = String::from(
        "UPDATE theaters \
         SET document = jsonb_set(document, $2::text[], to_jsonb($3::boolean), true) \
         WHERE id = $1 AND (document #> $2::text[]) IS DISTINCT FROM to_jsonb($3::boolean)",
    );
    for i in 0..guard_count {
        let path = 4 + 2 * i;
        sql.push_str(&format!(" AND document #>> ${}::text[] = ${}", path, path + 1));
    }
    sql
}

/// Документы кинотеатров в колонке JSONB таблицы `theaters`.
#[derive(Clone)]
pub struct PgTheaterStore {
    pool: PgPool,
}

impl PgTheaterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TheaterStore for PgTheaterStore {
    async fn list_summaries(&self) -> Result<Vec<TheaterSummary>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, Json<Location>)>(
            r#"
            SELECT document->>'id', document->>'name', document->'location'
            FROM theaters
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, Json(location))| TheaterSummary { id, name, location })
            .collect())
    }

    async fn find(&self, id: &str) -> Result<Option<Theater>, StoreError> {
        let row = sqlx::query_scalar::<_, Json<Theater>>("SELECT document FROM theaters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(t)| t))
    }

    async fn find_by_city(&self, city: &str) -> Result<Vec<Theater>, StoreError> {
        let rows = sqlx::query_scalar::<_, Json<Theater>>(
            r#"
            SELECT document FROM theaters
            WHERE document->'location'->>'city' = $1
            ORDER BY created_at
            "#,
        )
        .bind(city)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(t)| t).collect())
    }

    async fn insert(&self, theater: &Theater) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO theaters (id, document) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(&theater.id)
        .bind(Json(theater))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_details(&self, id: &str, details: &TheaterDetails) -> Result<Option<Theater>, StoreError> {
        let row = sqlx::query_scalar::<_, Json<Theater>>(
            r#"
            UPDATE theaters
            SET document = document
                || jsonb_build_object('name', $2::text, 'location', $3::jsonb)
                || CASE WHEN $4::jsonb IS NULL THEN '{}'::jsonb
                        ELSE jsonb_build_object('amenities', $4::jsonb) END
            WHERE id = $1
            RETURNING document
            "#,
        )
        .bind(id)
        .bind(&details.name)
        .bind(Json(&details.location))
        .bind(details.amenities.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(t)| t))
    }

    async fn set_seating_layout(&self, id: &str, layout: &[SeatRow]) -> Result<Option<Theater>, StoreError> {
        let row = sqlx::query_scalar::<_, Json<Theater>>(
            r#"
            UPDATE theaters
            SET document = jsonb_set(document, '{seating_layout}', $2::jsonb, true)
            WHERE id = $1
            RETURNING document
            "#,
        )
        .bind(id)
        .bind(Json(layout))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(t)| t))
    }

    async fn push_movie(&self, id: &str, movie: &Movie) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE theaters
            SET document = jsonb_set(
                document,
                '{movies}',
                COALESCE(document->'movies', '[]'::jsonb) || jsonb_build_array($2::jsonb),
                true
            )
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(movie))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_movie(&self, id: &str, movie_id: &str) -> Result<Option<Theater>, StoreError> {
        let row = sqlx::query_scalar::<_, Json<Theater>>(
            r#"
            UPDATE theaters
            SET document = jsonb_set(
                document,
                '{movies}',
                COALESCE(
                    (SELECT jsonb_agg(m ORDER BY ord)
                     FROM jsonb_array_elements(document->'movies') WITH ORDINALITY AS e(m, ord)
                     WHERE m->>'id' <> $2),
                    '[]'::jsonb
                ),
                true
            )
            WHERE id = $1
            RETURNING document
            "#,
        )
        .bind(id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(t)| t))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM theaters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_seat_availability(
        &self,
        id: &str,
        location: &SeatLocation,
        available: bool,
    ) -> Result<u64, StoreError> {
        // Путь вычислен по прочитанному документу. Ключевые условия в WHERE
        // перепроверяются на последней версии строки после блокировки, так
        // что сдвиг массивов даёт 0 строк, а не запись в чужое место.
        let guards = location.key_guards();
        let sql = seat_update_sql(guards.len());

        let mut query = sqlx::query(&sql)
            .bind(id)
            .bind(location.availability_path())
            .bind(available);
        for (path, key) in guards {
            query = query.bind(path).bind(key);
        }

        let result = query.execute(&self.pool).await?;
        debug!(
            "seat update theater={} path={:?} rows={}",
            id,
            location.availability_path(),
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }
}
