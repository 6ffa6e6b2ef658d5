//! catalog.rs
//!
//! Сервисный слой каталога: кинотеатры, фильмы, сеансы и места.
//!
//! - Валидация входа выполняется до обращения к хранилищу.
//! - Создание фильма разворачивает окно проката в сетку сеансов
//!   (`showtimes::expand_window`) и дописывает фильм в документ кинотеатра.
//! - Смена доступности места делегируется `seats::set_seat_availability`.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::seats::{self, SeatTarget};
use super::showtimes::{self, BookingWindow, ShowtimeError, DEFAULT_MAX_WINDOW_DAYS};
use crate::error::{AppError, AppResult, Entity};
use crate::models::{
    Movie, MovieListing, SeatRow, SeatingLayout, Theater, TheaterListing, TheaterSummary,
};
use crate::store::{TheaterDetails, TheaterStore};

/// Поля нового фильма; даты в формате `dd-mm-yyyy`.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub genre: String,
    pub duration: u32,
    pub rating: String,
    pub description: String,
    pub poster: String,
    pub language: String,
    pub start_date: String,
    pub end_date: String,
    pub time_slots: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CreatedMovie {
    pub movie_id: String,
    pub total_showtimes: usize,
    pub movie: Movie,
}

/// Фильтры `GET /search`. Город обязателен.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub city: String,
    pub title: Option<String>,
    pub language: Option<String>,
    pub date: Option<String>,
}

impl SearchFilters {
    fn has_movie_filters(&self) -> bool {
        self.title.is_some() || self.language.is_some() || self.date.is_some()
    }

    fn no_movies_message(&self) -> String {
        let mut filters = Vec::new();
        if let Some(title) = &self.title {
            filters.push(format!("title containing \"{}\"", title));
        }
        if let Some(language) = &self.language {
            filters.push(format!("in {} language", language));
        }
        if let Some(date) = &self.date {
            filters.push(format!("on date {}", date));
        }
        format!("No movies found with {} in the specified city.", filters.join(" and "))
    }
}

/// Отбор фильмов и сеансов по фильтрам; кинотеатры без подходящих фильмов
/// выпадают из результата.
pub fn filter_theaters(theaters: &[Theater], filters: &SearchFilters) -> Vec<TheaterListing> {
    if !filters.has_movie_filters() {
        return theaters.iter().map(TheaterListing::from).collect();
    }

    let title = filters.title.as_deref().map(str::to_lowercase);
    let language = filters.language.as_deref().map(str::to_lowercase);

    theaters
        .iter()
        .filter_map(|theater| {
            let movies: Vec<MovieListing> = theater
                .movies
                .iter()
                .filter(|m| title.as_ref().map_or(true, |t| m.title.to_lowercase().contains(t)))
                .filter(|m| language.as_ref().map_or(true, |l| m.language.to_lowercase() == *l))
                .filter_map(|m| {
                    let mut listing = MovieListing::from(m);
                    if let Some(date) = &filters.date {
                        listing.showtimes.retain(|s| &s.date == date);
                        if listing.showtimes.is_empty() {
                            return None;
                        }
                    }
                    Some(listing)
                })
                .collect();

            (!movies.is_empty()).then(|| TheaterListing::new(theater, movies))
        })
        .collect()
}

#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn TheaterStore>,
    max_window_days: u32,
}

impl Catalog {
    pub fn new(store: Arc<dyn TheaterStore>) -> Self {
        Self {
            store,
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
        }
    }

    /// Предел длины окна проката нового фильма, в днях.
    pub fn with_max_window_days(mut self, days: u32) -> Self {
        self.max_window_days = days;
        self
    }

    async fn require_theater(&self, id: &str) -> AppResult<Theater> {
        self.store
            .find(id)
            .await?
            .ok_or(AppError::NotFound(Entity::Theater))
    }

    // --- Чтение ---

    pub async fn list_theaters(&self) -> AppResult<Vec<TheaterSummary>> {
        Ok(self.store.list_summaries().await?)
    }

    pub async fn get_theater(&self, id: &str) -> AppResult<TheaterListing> {
        let theater = self.require_theater(id).await?;
        Ok(TheaterListing::from(&theater))
    }

    pub async fn search(&self, filters: &SearchFilters) -> AppResult<Vec<TheaterListing>> {
        if filters.city.trim().is_empty() {
            return Err(AppError::Validation("Please provide a city to search.".into()));
        }

        let theaters = self.store.find_by_city(&filters.city).await?;
        if theaters.is_empty() {
            return Err(AppError::NoResults("No theater found for the given city.".into()));
        }

        let found = filter_theaters(&theaters, filters);
        if found.is_empty() {
            return Err(AppError::NoResults(filters.no_movies_message()));
        }
        Ok(found)
    }

    /// Схема зала конкретного сеанса.
    pub async fn showtime_layout(
        &self,
        theater_id: &str,
        movie_id: &str,
        date: &str,
        time: &str,
    ) -> AppResult<SeatingLayout> {
        let theater = self.require_theater(theater_id).await?;
        let slot = theater
            .movie(movie_id)
            .ok_or(AppError::NotFound(Entity::Movie))?
            .showtime(date)
            .and_then(|s| s.slot(time))
            .ok_or(AppError::NotFound(Entity::Showtime))?;
        Ok(slot.seating_layout.clone())
    }

    // --- Администрирование ---

    pub async fn create_theater(&self, theater: Theater) -> AppResult<Theater> {
        if !self.store.insert(&theater).await? {
            return Err(AppError::DuplicateTheater);
        }
        info!("Theater {} created", theater.id);
        Ok(theater)
    }

    pub async fn update_theater(&self, id: &str, details: TheaterDetails) -> AppResult<Theater> {
        let updated = self
            .store
            .update_details(id, &details)
            .await?
            .ok_or(AppError::NotFound(Entity::Theater))?;
        info!("Theater {} updated", id);
        Ok(updated)
    }

    pub async fn delete_theater(&self, id: &str) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(Entity::Theater));
        }
        info!("Theater {} deleted", id);
        Ok(())
    }

    /// Заменяет базовую схему зала. Уже созданные сеансы не меняются.
    pub async fn set_seating_layout(&self, id: &str, layout: Vec<SeatRow>) -> AppResult<Theater> {
        let updated = self
            .store
            .set_seating_layout(id, &layout)
            .await?
            .ok_or(AppError::NotFound(Entity::Theater))?;
        info!("Seating layout of theater {} replaced: {} rows", id, layout.len());
        Ok(updated)
    }

    pub async fn create_movie_with_showtimes(&self, theater_id: &str, new: NewMovie) -> AppResult<CreatedMovie> {
        if new.time_slots.is_empty() {
            return Err(AppError::Validation("Showtimes must be a non-empty array of strings.".into()));
        }
        // Слот ищется по метке времени, дубликат был бы недостижим
        let mut seen = HashSet::new();
        if let Some(time) = new.time_slots.iter().find(|t| !seen.insert(t.as_str())) {
            return Err(AppError::Validation(format!("Duplicate showtime '{}'.", time)));
        }
        let window = BookingWindow::parse(&new.start_date, &new.end_date, self.max_window_days)?;

        let theater = self.require_theater(theater_id).await?;
        if !theater.has_seating_layout() {
            return Err(ShowtimeError::EmptySeatingTemplate.into());
        }

        let expansion = showtimes::expand_window(&window, &new.time_slots, &theater.seating_layout)?;

        let movie = Movie {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            genre: new.genre,
            duration: new.duration,
            rating: new.rating,
            description: new.description,
            poster: new.poster,
            language: new.language,
            start_date: window.start,
            end_date: window.end,
            showtimes: expansion.showtimes,
        };

        if !self.store.push_movie(theater_id, &movie).await? {
            return Err(AppError::NotFound(Entity::Theater));
        }

        info!(
            "Movie {} added to theater {}: {} days, {} showtimes",
            movie.id,
            theater_id,
            window.days(),
            movie.total_showtimes()
        );

        Ok(CreatedMovie {
            movie_id: movie.id.clone(),
            total_showtimes: movie.total_showtimes(),
            movie,
        })
    }

    pub async fn delete_movie(&self, theater_id: &str, movie_id: &str) -> AppResult<Theater> {
        let theater = self.require_theater(theater_id).await?;
        if theater.movie(movie_id).is_none() {
            return Err(AppError::NotFound(Entity::Movie));
        }
        let updated = self
            .store
            .remove_movie(theater_id, movie_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Theater))?;
        info!("Movie {} removed from theater {}", movie_id, theater_id);
        Ok(updated)
    }

    pub async fn update_seat_availability(&self, target: &SeatTarget, available: bool) -> AppResult<()> {
        seats::set_seat_availability(self.store.as_ref(), target, available).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amenities, Location, Seat, SeatCategory};
    use crate::store::MemoryTheaterStore;

    fn theater(id: &str, city: &str) -> Theater {
        Theater {
            id: id.into(),
            name: format!("Theater {}", id),
            location: Location {
                address_line: String::new(),
                city: city.into(),
                state: "KA".into(),
                pincode: "560001".into(),
            },
            amenities: Amenities::default(),
            movies: vec![],
            seating_layout: vec![SeatRow {
                row: "A".into(),
                seats: vec![Seat { number: "A1".into(), category: SeatCategory::Balcony, price: 300.0, available: true }],
            }],
        }
    }

    fn new_movie(title: &str, language: &str, start: &str, end: &str) -> NewMovie {
        NewMovie {
            title: title.into(),
            genre: "Action".into(),
            duration: 150,
            rating: "UA".into(),
            description: "desc".into(),
            poster: "poster.png".into(),
            language: language.into(),
            start_date: start.into(),
            end_date: end.into(),
            time_slots: vec!["10:00 AM".into(), "6:00 PM".into()],
        }
    }

    async fn catalog_with(theaters: &[Theater]) -> Catalog {
        let store = Arc::new(MemoryTheaterStore::new());
        for t in theaters {
            store.insert(t).await.unwrap();
        }
        Catalog::new(store)
    }

    #[tokio::test]
    async fn create_movie_generates_grid_and_persists_it() {
        let catalog = catalog_with(&[theater("t1", "Bengaluru")]).await;
        let created = catalog
            .create_movie_with_showtimes("t1", new_movie("Leo", "Tamil", "01-01-2025", "03-01-2025"))
            .await
            .unwrap();

        assert_eq!(created.total_showtimes, 6);
        assert_eq!(created.movie.showtimes.len(), 3);
        assert!(Uuid::parse_str(&created.movie_id).is_ok());

        let layout = catalog.showtime_layout("t1", &created.movie_id, "02-01-2025", "6:00 PM").await.unwrap();
        assert_eq!(layout[0].seats[0].number, "A1");
    }

    #[tokio::test]
    async fn create_movie_requires_template() {
        let mut bare = theater("t1", "Bengaluru");
        bare.seating_layout.clear();
        let catalog = catalog_with(&[bare]).await;

        let err = catalog
            .create_movie_with_showtimes("t1", new_movie("Leo", "Tamil", "01-01-2025", "03-01-2025"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("seating layout")));
    }

    #[tokio::test]
    async fn create_movie_validates_before_lookup() {
        let catalog = catalog_with(&[]).await;

        let err = catalog
            .create_movie_with_showtimes("missing", new_movie("Leo", "Tamil", "20-03-2025", "10-03-2025"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut no_slots = new_movie("Leo", "Tamil", "01-03-2025", "10-03-2025");
        no_slots.time_slots.clear();
        let err = catalog.create_movie_with_showtimes("missing", no_slots).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = catalog
            .create_movie_with_showtimes("missing", new_movie("Leo", "Tamil", "01-03-2025", "10-03-2025"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(Entity::Theater)));
    }

    #[tokio::test]
    async fn create_movie_rejects_duplicate_times() {
        let catalog = catalog_with(&[theater("t1", "Bengaluru")]).await;
        let mut movie = new_movie("Leo", "Tamil", "01-01-2025", "02-01-2025");
        movie.time_slots = vec!["6:00 PM".into(), "9:00 PM".into(), "6:00 PM".into()];

        let err = catalog.create_movie_with_showtimes("t1", movie).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Duplicate showtime '6:00 PM'."));
        assert!(catalog.get_theater("t1").await.unwrap().movies.is_empty());
    }

    #[tokio::test]
    async fn create_movie_respects_window_limit() {
        let catalog = catalog_with(&[theater("t1", "Bengaluru")]).await.with_max_window_days(7);

        let err = catalog
            .create_movie_with_showtimes("t1", new_movie("Leo", "Tamil", "01-01-2025", "08-01-2025"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Booking window cannot be longer than 7 days."));

        let created = catalog
            .create_movie_with_showtimes("t1", new_movie("Leo", "Tamil", "01-01-2025", "07-01-2025"))
            .await
            .unwrap();
        assert_eq!(created.total_showtimes, 14);
    }

    #[tokio::test]
    async fn replacing_template_leaves_generated_layouts() {
        let catalog = catalog_with(&[theater("t1", "Bengaluru")]).await;
        let created = catalog
            .create_movie_with_showtimes("t1", new_movie("Leo", "Tamil", "01-01-2025", "01-01-2025"))
            .await
            .unwrap();

        catalog.set_seating_layout("t1", vec![]).await.unwrap();

        let layout = catalog.showtime_layout("t1", &created.movie_id, "01-01-2025", "10:00 AM").await.unwrap();
        assert_eq!(layout.len(), 1);
    }

    #[tokio::test]
    async fn delete_movie_distinguishes_missing_movie() {
        let catalog = catalog_with(&[theater("t1", "Bengaluru")]).await;
        let err = catalog.delete_movie("t1", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Entity::Movie)));
        let err = catalog.delete_movie("t2", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(Entity::Theater)));
    }

    #[tokio::test]
    async fn search_filters_movies_and_showtimes() {
        let catalog = catalog_with(&[theater("t1", "Chennai"), theater("t2", "Chennai"), theater("t3", "Madurai")]).await;
        catalog
            .create_movie_with_showtimes("t1", new_movie("Leo", "Tamil", "01-01-2025", "03-01-2025"))
            .await
            .unwrap();
        catalog
            .create_movie_with_showtimes("t2", new_movie("Jawan", "Hindi", "05-01-2025", "06-01-2025"))
            .await
            .unwrap();

        let all = catalog.search(&SearchFilters { city: "Chennai".into(), ..Default::default() }).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_title = catalog
            .search(&SearchFilters { city: "Chennai".into(), title: Some("le".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "t1");

        let by_date = catalog
            .search(&SearchFilters { city: "Chennai".into(), date: Some("02-01-2025".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].movies[0].showtimes.len(), 1);
        assert_eq!(by_date[0].movies[0].showtimes[0].date, "02-01-2025");

        let by_language = catalog
            .search(&SearchFilters { city: "Chennai".into(), language: Some("HINDI".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_language[0].id, "t2");
    }

    #[tokio::test]
    async fn search_misses_are_reported() {
        let catalog = catalog_with(&[theater("t1", "Chennai")]).await;

        let err = catalog.search(&SearchFilters::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = catalog.search(&SearchFilters { city: "Delhi".into(), ..Default::default() }).await.unwrap_err();
        assert!(matches!(err, AppError::NoResults(ref m) if m == "No theater found for the given city."));

        let err = catalog
            .search(&SearchFilters {
                city: "Chennai".into(),
                title: Some("Leo".into()),
                language: Some("Tamil".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::NoResults(ref m)
                if m == "No movies found with title containing \"Leo\" and in Tamil language in the specified city."
        ));
    }
}
