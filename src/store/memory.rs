use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SeatLocation, StoreError, TheaterDetails, TheaterStore};
use crate::models::{Movie, SeatRow, Theater, TheaterSummary};

/// Хранилище в памяти процесса: для тестов и запуска без `DATABASE_URL`.
/// Порядок вставки сохраняется, как у таблицы с `ORDER BY created_at`.
#[derive(Default)]
pub struct MemoryTheaterStore {
    theaters: RwLock<Vec<Theater>>,
}

impl MemoryTheaterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn position(theaters: &[Theater], id: &str) -> Option<usize> {
    theaters.iter().position(|t| t.id == id)
}

#[async_trait]
impl TheaterStore for MemoryTheaterStore {
    async fn list_summaries(&self) -> Result<Vec<TheaterSummary>, StoreError> {
        let theaters = self.theaters.read().await;
        Ok(theaters.iter().map(TheaterSummary::from).collect())
    }

    async fn find(&self, id: &str) -> Result<Option<Theater>, StoreError> {
        let theaters = self.theaters.read().await;
        Ok(theaters.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_city(&self, city: &str) -> Result<Vec<Theater>, StoreError> {
        let theaters = self.theaters.read().await;
        Ok(theaters.iter().filter(|t| t.location.city == city).cloned().collect())
    }

    async fn insert(&self, theater: &Theater) -> Result<bool, StoreError> {
        let mut theaters = self.theaters.write().await;
        if position(&theaters, &theater.id).is_some() {
            return Ok(false);
        }
        theaters.push(theater.clone());
        Ok(true)
    }

    async fn update_details(&self, id: &str, details: &TheaterDetails) -> Result<Option<Theater>, StoreError> {
        let mut theaters = self.theaters.write().await;
        let Some(idx) = position(&theaters, id) else {
            return Ok(None);
        };
        let theater = &mut theaters[idx];
        theater.name = details.name.clone();
        theater.location = details.location.clone();
        if let Some(amenities) = &details.amenities {
            theater.amenities = amenities.clone();
        }
        Ok(Some(theater.clone()))
    }

    async fn set_seating_layout(&self, id: &str, layout: &[SeatRow]) -> Result<Option<Theater>, StoreError> {
        let mut theaters = self.theaters.write().await;
        let Some(idx) = position(&theaters, id) else {
            return Ok(None);
        };
        theaters[idx].seating_layout = layout.to_vec();
        Ok(Some(theaters[idx].clone()))
    }

    async fn push_movie(&self, id: &str, movie: &Movie) -> Result<bool, StoreError> {
        let mut theaters = self.theaters.write().await;
        let Some(idx) = position(&theaters, id) else {
            return Ok(false);
        };
        theaters[idx].movies.push(movie.clone());
        Ok(true)
    }

    async fn remove_movie(&self, id: &str, movie_id: &str) -> Result<Option<Theater>, StoreError> {
        let mut theaters = self.theaters.write().await;
        let Some(idx) = position(&theaters, id) else {
            return Ok(None);
        };
        theaters[idx].movies.retain(|m| m.id != movie_id);
        Ok(Some(theaters[idx].clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut theaters = self.theaters.write().await;
        let before = theaters.len();
        theaters.retain(|t| t.id != id);
        Ok(theaters.len() < before)
    }

    async fn set_seat_availability(
        &self,
        id: &str,
        location: &SeatLocation,
        available: bool,
    ) -> Result<u64, StoreError> {
        let mut theaters = self.theaters.write().await;
        let Some(idx) = position(&theaters, id) else {
            return Ok(0);
        };

        // Те же условия, что и в SQL: ключ на каждой позиции должен совпасть.
        let seat = theaters[idx]
            .movies
            .get_mut(location.movie.index)
            .filter(|m| m.id == location.movie.key)
            .and_then(|m| m.showtimes.get_mut(location.showtime.index))
            .filter(|s| s.date == location.showtime.key)
            .and_then(|s| s.times.get_mut(location.slot.index))
            .filter(|t| t.time == location.slot.key)
            .and_then(|t| t.seating_layout.get_mut(location.row.index))
            .filter(|r| r.row == location.row.key)
            .and_then(|r| r.seats.get_mut(location.seat.index))
            .filter(|s| s.number == location.seat.key);

        match seat {
            Some(seat) if seat.available != available => {
                seat.available = available;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amenities, Location, Seat, SeatCategory, Showtime, ShowtimeSlot};
    use crate::store::PathStep;
    use chrono::NaiveDate;

    fn layout() -> Vec<SeatRow> {
        vec![SeatRow {
            row: "A".into(),
            seats: vec![
                Seat { number: "A1".into(), category: SeatCategory::Balcony, price: 300.0, available: true },
                Seat { number: "A2".into(), category: SeatCategory::Balcony, price: 300.0, available: true },
            ],
        }]
    }

    fn movie(id: &str) -> Movie {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Movie {
            id: id.into(),
            title: "Title".into(),
            genre: "Drama".into(),
            duration: 120,
            rating: "U".into(),
            description: "d".into(),
            poster: "p".into(),
            language: "English".into(),
            start_date: date,
            end_date: date,
            showtimes: vec![Showtime {
                date: "01-01-2025".into(),
                day: "Wednesday".into(),
                times: vec![ShowtimeSlot { time: "6:00 PM".into(), seating_layout: layout() }],
            }],
        }
    }

    fn theater() -> Theater {
        Theater {
            id: "t1".into(),
            name: "Galaxy".into(),
            location: Location {
                address_line: "1 Main St".into(),
                city: "Chennai".into(),
                state: "TN".into(),
                pincode: "600001".into(),
            },
            amenities: Amenities::default(),
            movies: vec![movie("m1"), movie("m2")],
            seating_layout: layout(),
        }
    }

    fn location(movie_index: usize, movie_id: &str, seat_index: usize, seat: &str) -> SeatLocation {
        SeatLocation {
            movie: PathStep::new(movie_index, movie_id),
            showtime: PathStep::new(0, "01-01-2025"),
            slot: PathStep::new(0, "6:00 PM"),
            row: PathStep::new(0, "A"),
            seat: PathStep::new(seat_index, seat),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_id() {
        let store = MemoryTheaterStore::new();
        assert!(store.insert(&theater()).await.unwrap());
        assert!(!store.insert(&theater()).await.unwrap());
        assert_eq!(store.list_summaries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn seat_write_touches_one_leaf() {
        let store = MemoryTheaterStore::new();
        store.insert(&theater()).await.unwrap();

        let modified = store.set_seat_availability("t1", &location(1, "m2", 1, "A2"), false).await.unwrap();
        assert_eq!(modified, 1);

        let t = store.find("t1").await.unwrap().unwrap();
        let seats = &t.movies[1].showtimes[0].times[0].seating_layout[0].seats;
        assert!(seats[0].available);
        assert!(!seats[1].available);
        assert!(t.movies[0].showtimes[0].times[0].seating_layout[0].seats[1].available);
        assert!(t.seating_layout[0].seats[1].available);
    }

    #[tokio::test]
    async fn repeated_write_is_not_a_modification() {
        let store = MemoryTheaterStore::new();
        store.insert(&theater()).await.unwrap();
        let loc = location(0, "m1", 0, "A1");

        assert_eq!(store.set_seat_availability("t1", &loc, false).await.unwrap(), 1);
        assert_eq!(store.set_seat_availability("t1", &loc, false).await.unwrap(), 0);
        assert_eq!(store.set_seat_availability("t1", &loc, true).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn shifted_index_matches_nothing() {
        let store = MemoryTheaterStore::new();
        store.insert(&theater()).await.unwrap();
        // m2 был на позиции 1; после удаления m1 на позиции 1 ничего нет,
        // а на позиции 0 другой ключ не должен совпасть со старым путём.
        let stale = location(1, "m2", 0, "A1");
        store.remove_movie("t1", "m1").await.unwrap();

        assert_eq!(store.set_seat_availability("t1", &stale, false).await.unwrap(), 0);
        let mismatched = location(0, "m1", 0, "A1");
        assert_eq!(store.set_seat_availability("t1", &mismatched, false).await.unwrap(), 0);

        let t = store.find("t1").await.unwrap().unwrap();
        assert!(t.movies[0].showtimes[0].times[0].seating_layout[0].seats[0].available);
    }

    #[tokio::test]
    async fn missing_theater_modifies_nothing() {
        let store = MemoryTheaterStore::new();
        assert_eq!(store.set_seat_availability("nope", &location(0, "m1", 0, "A1"), false).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_details_keeps_amenities_when_absent() {
        let store = MemoryTheaterStore::new();
        let mut t = theater();
        t.amenities.facilities = vec!["parking".into()];
        store.insert(&t).await.unwrap();

        let details = TheaterDetails { name: "Galaxy 2".into(), location: t.location.clone(), amenities: None };
        let updated = store.update_details("t1", &details).await.unwrap().unwrap();
        assert_eq!(updated.name, "Galaxy 2");
        assert_eq!(updated.amenities.facilities, vec!["parking".to_string()]);
        assert_eq!(updated.movies.len(), 2);
    }

    #[tokio::test]
    async fn find_by_city_is_exact() {
        let store = MemoryTheaterStore::new();
        store.insert(&theater()).await.unwrap();
        assert_eq!(store.find_by_city("Chennai").await.unwrap().len(), 1);
        assert!(store.find_by_city("chennai").await.unwrap().is_empty());
    }
}
