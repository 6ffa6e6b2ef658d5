//! Поиск места внутри документа кинотеатра и точечная смена его доступности.

use tracing::{info, warn};

use crate::error::{AppError, Entity};
use crate::models::Theater;
use crate::store::{PathStep, SeatLocation, TheaterStore};

/// Какое место менять. Все поля сравниваются строго, с учётом регистра.
#[derive(Debug, Clone)]
pub struct SeatTarget {
    pub theater_id: String,
    pub movie_id: String,
    pub date: String,
    pub time: String,
    pub row: String,
    pub seat_number: String,
}

/// Спуск фильм → дата → время → ряд → место; первый промах останавливает поиск.
pub fn locate(theater: &Theater, target: &SeatTarget) -> Result<SeatLocation, Entity> {
    let (movie_idx, movie) = theater
        .movies
        .iter()
        .enumerate()
        .find(|(_, m)| m.id == target.movie_id)
        .ok_or(Entity::Movie)?;

    let (showtime_idx, showtime) = movie
        .showtimes
        .iter()
        .enumerate()
        .find(|(_, s)| s.date == target.date)
        .ok_or(Entity::Showtime)?;

    let (slot_idx, slot) = showtime
        .times
        .iter()
        .enumerate()
        .find(|(_, t)| t.time == target.time)
        .ok_or(Entity::Showtime)?;

    let (row_idx, row) = slot
        .seating_layout
        .iter()
        .enumerate()
        .find(|(_, r)| r.row == target.row)
        .ok_or(Entity::Row)?;

    let seat_idx = row
        .seats
        .iter()
        .position(|s| s.number == target.seat_number)
        .ok_or(Entity::Seat)?;

    Ok(SeatLocation {
        movie: PathStep::new(movie_idx, &movie.id),
        showtime: PathStep::new(showtime_idx, &showtime.date),
        slot: PathStep::new(slot_idx, &slot.time),
        row: PathStep::new(row_idx, &row.row),
        seat: PathStep::new(seat_idx, &target.seat_number),
    })
}

/// Находит место и выставляет флаг одной условной записью.
///
/// `UpdateFailed` означает, что место было найдено, но запись ничего не
/// изменила: флаг уже имел это значение или документ успел поменяться.
pub async fn set_seat_availability(
    store: &dyn TheaterStore,
    target: &SeatTarget,
    available: bool,
) -> Result<(), AppError> {
    let theater = store
        .find(&target.theater_id)
        .await?
        .ok_or(AppError::NotFound(Entity::Theater))?;

    let location = locate(&theater, target).map_err(AppError::NotFound)?;

    let modified = store
        .set_seat_availability(&target.theater_id, &location, available)
        .await?;

    if modified == 0 {
        warn!(
            "Seat {} row {} ({} {}) in movie {} was not updated",
            target.seat_number, target.row, target.date, target.time, target.movie_id
        );
        return Err(AppError::UpdateFailed);
    }

    info!(
        "Seat {} row {} ({} {}) in theater {} set available={}",
        target.seat_number, target.row, target.date, target.time, target.theater_id, available
    );
    Ok(())
}
