//! Хранилище документов кинотеатров.
//!
//! Каждый кинотеатр хранится одним документом со всеми фильмами, сеансами и
//! схемами залов. Все изменения точечные: ни одна операция не перезаписывает
//! документ целиком, поэтому параллельные изменения разных мест не теряются.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Amenities, Location, Movie, SeatRow, Theater, TheaterSummary};

pub mod memory;
pub mod postgres;

pub use memory::MemoryTheaterStore;
pub use postgres::PgTheaterStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Поля, которые меняет `PUT /admin/theater/{id}`.
#[derive(Debug, Clone)]
pub struct TheaterDetails {
    pub name: String,
    pub location: Location,
    /// `None` оставляет удобства как есть.
    pub amenities: Option<Amenities>,
}

/// Один шаг пути внутри документа: позиция в массиве и ключ элемента на ней.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub index: usize,
    pub key: String,
}

impl PathStep {
    pub fn new(index: usize, key: impl Into<String>) -> Self {
        Self { index, key: key.into() }
    }
}

/// Положение места в документе кинотеатра, найденное при чтении.
///
/// Позиции адресуют запись, ключи её охраняют: если между чтением и записью
/// массив сдвинулся, ключ на позиции не совпадёт и запись ничего не изменит.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatLocation {
    pub movie: PathStep,
    pub showtime: PathStep,
    pub slot: PathStep,
    pub row: PathStep,
    pub seat: PathStep,
}

impl SeatLocation {
    fn seat_prefix(&self) -> Vec<String> {
        vec![
            "movies".into(),
            self.movie.index.to_string(),
            "showtimes".into(),
            self.showtime.index.to_string(),
            "times".into(),
            self.slot.index.to_string(),
            "seating_layout".into(),
            self.row.index.to_string(),
            "seats".into(),
            self.seat.index.to_string(),
        ]
    }

    /// Путь к флагу `available`.
    pub fn availability_path(&self) -> Vec<String> {
        let mut path = self.seat_prefix();
        path.push("available".into());
        path
    }

    /// Пары (путь к ключевому полю, ожидаемое значение) от фильма до места.
    pub fn key_guards(&self) -> Vec<(Vec<String>, &str)> {
        let full = self.seat_prefix();
        let guard = |depth: usize, field: &str| {
            let mut path = full[..depth].to_vec();
            path.push(field.to_string());
            path
        };
        vec![
            (guard(2, "id"), self.movie.key.as_str()),
            (guard(4, "date"), self.showtime.key.as_str()),
            (guard(6, "time"), self.slot.key.as_str()),
            (guard(8, "row"), self.row.key.as_str()),
            (guard(10, "number"), self.seat.key.as_str()),
        ]
    }
}

#[async_trait]
pub trait TheaterStore: Send + Sync {
    async fn list_summaries(&self) -> Result<Vec<TheaterSummary>, StoreError>;
    async fn find(&self, id: &str) -> Result<Option<Theater>, StoreError>;
    async fn find_by_city(&self, city: &str) -> Result<Vec<Theater>, StoreError>;
    /// `false`, если кинотеатр с таким id уже есть.
    async fn insert(&self, theater: &Theater) -> Result<bool, StoreError>;
    async fn update_details(&self, id: &str, details: &TheaterDetails) -> Result<Option<Theater>, StoreError>;
    async fn set_seating_layout(&self, id: &str, layout: &[SeatRow]) -> Result<Option<Theater>, StoreError>;
    /// `false`, если кинотеатр не найден.
    async fn push_movie(&self, id: &str, movie: &Movie) -> Result<bool, StoreError>;
    async fn remove_movie(&self, id: &str, movie_id: &str) -> Result<Option<Theater>, StoreError>;
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
    /// Условная запись одного флага. Возвращает число изменённых документов:
    /// 0, если ключи на пути не совпали или флаг уже имел это значение.
    async fn set_seat_availability(
        &self,
        id: &str,
        location: &SeatLocation,
        available: bool,
    ) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> SeatLocation {
        SeatLocation {
            movie: PathStep::new(1, "m-1"),
            showtime: PathStep::new(0, "01-01-2025"),
            slot: PathStep::new(2, "6:00 PM"),
            row: PathStep::new(3, "D"),
            seat: PathStep::new(4, "D5"),
        }
    }

    #[test]
    fn availability_path_walks_every_level() {
        assert_eq!(
            location().availability_path(),
            vec![
                "movies", "1", "showtimes", "0", "times", "2", "seating_layout", "3", "seats", "4",
                "available"
            ]
        );
    }

    #[test]
    fn guards_check_keys_at_each_level() {
        let loc = location();
        let guards = loc.key_guards();
        assert_eq!(guards.len(), 5);
        assert_eq!(guards[0], (vec!["movies".to_string(), "1".into(), "id".into()], "m-1"));
        assert_eq!(guards[2].0.last().map(String::as_str), Some("time"));
        assert_eq!(guards[4].0.len(), 11);
        assert_eq!(guards[4].1, "D5");
    }
}
