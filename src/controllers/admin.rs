use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{delete, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::guard_seat_updates;
use crate::models::{Amenities, Location, Seat, SeatCategory, SeatRow, Theater};
use crate::services::catalog::NewMovie;
use crate::services::seats::SeatTarget;
use crate::store::TheaterDetails;
use crate::AppState;

pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/theater", post(create_theater))
        .route("/admin/theater/{id}", put(update_theater).delete(delete_theater))
        .route("/admin/theater/{id}/seating", post(set_seating_layout))
        .route("/admin/theater/{id}/movie", post(add_movie))
        .route("/admin/theater/{id}/movie/{movie_id}", delete(delete_movie))
        .route(
            "/admin/theater/{id}/movie/{movie_id}/showtime/{date}/{time}",
            put(update_seat).route_layer(from_fn_with_state(state, guard_seat_updates)),
        )
}

/* ---------- helpers ---------- */

const MISSING_MOVIE_FIELDS: &str = "Missing required fields for movie details.";

// Любая правка админом сбрасывает кеш каталога
async fn invalidate_cache(state: &AppState) {
    if let Some(cache) = &state.cache {
        cache.invalidate_catalog().await;
    }
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    let Json(value) = body?;
    Ok(value)
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
struct LocationInput {
    address_line: String,
    #[validate(length(min = 1, message = "Missing required fields for theater details."))]
    city: String,
    #[validate(length(min = 1, message = "Missing required fields for theater details."))]
    state: String,
    #[validate(length(min = 1, message = "Missing required fields for theater details."))]
    pincode: String,
}

impl From<LocationInput> for Location {
    fn from(input: LocationInput) -> Self {
        Location {
            address_line: input.address_line,
            city: input.city,
            state: input.state,
            pincode: input.pincode,
        }
    }
}

/* ---------- THEATERS ---------- */

// POST /admin/theater
#[derive(Debug, Deserialize, Validate)]
struct CreateTheaterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields for theater details."))]
    id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields for theater details."))]
    name: String,
    #[serde(default)]
    #[validate(nested)]
    location: LocationInput,
    amenities: Option<Amenities>,
}

async fn create_theater(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateTheaterRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let req = payload(body)?;
    req.validate()?;

    let theater = Theater {
        id: req.id,
        name: req.name,
        location: req.location.into(),
        amenities: req.amenities.unwrap_or_default(),
        movies: vec![],
        seating_layout: vec![],
    };
    let created = state.catalog.create_theater(theater).await?;
    invalidate_cache(&state).await;

    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /admin/theater/{id}
#[derive(Debug, Deserialize, Validate)]
struct UpdateTheaterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields for theater details."))]
    name: String,
    #[serde(default)]
    #[validate(nested)]
    location: LocationInput,
    amenities: Option<Amenities>,
}

async fn update_theater(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTheaterRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let req = payload(body)?;
    req.validate()?;

    let details = TheaterDetails {
        name: req.name,
        location: req.location.into(),
        amenities: req.amenities,
    };
    let updated = state.catalog.update_theater(&id, details).await?;
    invalidate_cache(&state).await;

    Ok(Json(updated))
}

// DELETE /admin/theater/{id}
async fn delete_theater(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.catalog.delete_theater(&id).await?;
    invalidate_cache(&state).await;

    Ok(Json(json!({ "message": "Theater successfully deleted" })))
}

/* ---------- SEATING TEMPLATE ---------- */

// POST /admin/theater/{id}/seating
#[derive(Debug, Deserialize)]
struct SeatingLayoutRequest {
    seating_layout: Option<Vec<RowInput>>,
}

#[derive(Debug, Deserialize)]
struct RowInput {
    row: Option<String>,
    seats: Option<Vec<SeatInput>>,
}

#[derive(Debug, Deserialize)]
struct SeatInput {
    number: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    available: Option<bool>,
}

fn build_layout(rows: Option<Vec<RowInput>>) -> AppResult<Vec<SeatRow>> {
    let invalid_row = || {
        AppError::Validation(
            "Invalid seating layout format. Each row should have a 'row' and 'seats' array.".into(),
        )
    };
    let rows = rows.ok_or_else(invalid_row)?;

    let mut row_labels = HashSet::new();
    let mut layout = Vec::with_capacity(rows.len());
    for input in rows {
        let label = input.row.filter(|r| !r.is_empty()).ok_or_else(invalid_row)?;
        let seats = input.seats.ok_or_else(invalid_row)?;
        if !row_labels.insert(label.clone()) {
            return Err(AppError::Validation(format!("Duplicate row '{}' in seating layout.", label)));
        }

        let mut numbers = HashSet::new();
        let mut built = Vec::with_capacity(seats.len());
        for seat in seats {
            let (Some(number), Some(category), Some(price)) = (seat.number, seat.category, seat.price) else {
                return Err(AppError::Validation("Each seat must have a number, category, and price.".into()));
            };
            if number.is_empty() || price == 0.0 {
                return Err(AppError::Validation("Each seat must have a number, category, and price.".into()));
            }
            if price < 0.0 {
                return Err(AppError::Validation("Seat price must be positive.".into()));
            }
            let category = SeatCategory::parse(&category).ok_or_else(|| {
                let valid: Vec<&str> = SeatCategory::ALL.iter().map(SeatCategory::as_str).collect();
                AppError::Validation(format!("Invalid category. Valid categories are: {}.", valid.join(", ")))
            })?;
            if !numbers.insert(number.clone()) {
                return Err(AppError::Validation(format!("Duplicate seat '{}' in row '{}'.", number, label)));
            }
            built.push(Seat {
                number,
                category,
                price,
                available: seat.available.unwrap_or(true),
            });
        }
        layout.push(SeatRow { row: label, seats: built });
    }
    Ok(layout)
}

async fn set_seating_layout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<SeatingLayoutRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let req = payload(body)?;
    let layout = build_layout(req.seating_layout)?;

    let updated = state.catalog.set_seating_layout(&id, layout).await?;
    invalidate_cache(&state).await;

    Ok((StatusCode::CREATED, Json(updated)))
}

/* ---------- MOVIES ---------- */

// POST /admin/theater/{id}/movie
#[derive(Debug, Deserialize, Validate)]
struct CreateMovieRequest {
    #[validate(required(message = "Missing required fields for movie details."), length(min = 1, message = "Missing required fields for movie details."))]
    title: Option<String>,
    #[validate(required(message = "Missing required fields for movie details."), length(min = 1, message = "Missing required fields for movie details."))]
    genre: Option<String>,
    #[validate(required(message = "Missing required fields for movie details."), range(min = 1, message = "Missing required fields for movie details."))]
    duration: Option<u32>,
    /// Список времён сеансов, например `["10:00 AM", "6:00 PM"]`.
    #[validate(required(message = "Missing required fields for movie details."))]
    showtimes: Option<Value>,
    #[validate(required(message = "Missing required fields for movie details."), length(min = 1, message = "Missing required fields for movie details."))]
    rating: Option<String>,
    #[validate(required(message = "Missing required fields for movie details."), length(min = 1, message = "Missing required fields for movie details."))]
    description: Option<String>,
    #[validate(required(message = "Missing required fields for movie details."), length(min = 1, message = "Missing required fields for movie details."))]
    poster: Option<String>,
    #[validate(required(message = "Missing required fields for movie details."), length(min = 1, message = "Missing required fields for movie details."))]
    start_date: Option<String>,
    #[validate(required(message = "Missing required fields for movie details."), length(min = 1, message = "Missing required fields for movie details."))]
    end_date: Option<String>,
    #[validate(required(message = "Missing required fields for movie details."), length(min = 1, message = "Missing required fields for movie details."))]
    language: Option<String>,
}

fn time_slots(value: Value) -> AppResult<Vec<String>> {
    let invalid = || AppError::Validation("Showtimes must be an array of strings.".into());
    let Value::Array(items) = value else {
        return Err(invalid());
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::String(time) => Ok(time),
            _ => Err(invalid()),
        })
        .collect()
}

impl CreateMovieRequest {
    fn into_new_movie(self) -> AppResult<NewMovie> {
        let missing = || AppError::Validation(MISSING_MOVIE_FIELDS.into());
        Ok(NewMovie {
            time_slots: time_slots(self.showtimes.ok_or_else(missing)?)?,
            title: self.title.ok_or_else(missing)?,
            genre: self.genre.ok_or_else(missing)?,
            duration: self.duration.ok_or_else(missing)?,
            rating: self.rating.ok_or_else(missing)?,
            description: self.description.ok_or_else(missing)?,
            poster: self.poster.ok_or_else(missing)?,
            language: self.language.ok_or_else(missing)?,
            start_date: self.start_date.ok_or_else(missing)?,
            end_date: self.end_date.ok_or_else(missing)?,
        })
    }
}

async fn add_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let req = payload(body)?;
    req.validate()?;
    let new_movie = req.into_new_movie()?;

    let created = state.catalog.create_movie_with_showtimes(&id, new_movie).await?;
    invalidate_cache(&state).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Movie added successfully",
            "movieId": created.movie_id,
            "totalShowtimes": created.total_showtimes,
            "movie": created.movie,
        })),
    ))
}

// DELETE /admin/theater/{id}/movie/{movie_id}
async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path((id, movie_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let theater = state.catalog.delete_movie(&id, &movie_id).await?;
    invalidate_cache(&state).await;

    Ok(Json(json!({
        "message": "Movie successfully deleted",
        "theater": theater,
    })))
}

/* ---------- SEATS ---------- */

// PUT /admin/theater/{id}/movie/{movie_id}/showtime/{date}/{time}
#[derive(Debug, Deserialize, Validate)]
struct SeatUpdateRequest {
    #[validate(required(message = "Both row and seatNumber are required."))]
    row: Option<String>,
    #[serde(rename = "seatNumber")]
    #[validate(required(message = "Both row and seatNumber are required."))]
    seat_number: Option<String>,
    available: Option<Value>,
}

async fn update_seat(
    State(state): State<Arc<AppState>>,
    Path((id, movie_id, date, time)): Path<(String, String, String, String)>,
    body: Result<Json<SeatUpdateRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let req = payload(body)?;
    let Some(Value::Bool(available)) = req.available else {
        return Err(AppError::Validation("'available' should be a boolean value.".into()));
    };
    req.validate()?;

    let target = SeatTarget {
        theater_id: id,
        movie_id,
        date,
        time,
        row: req.row.unwrap_or_default(),
        seat_number: req.seat_number.unwrap_or_default(),
    };
    // Кеш не содержит схем залов, поэтому здесь не сбрасывается
    state.catalog.update_seat_availability(&target, available).await?;

    Ok(Json(json!({ "message": "Seat availability updated successfully." })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seat(number: &str, category: &str, price: f64) -> SeatInput {
        SeatInput {
            number: Some(number.into()),
            category: Some(category.into()),
            price: Some(price),
            available: None,
        }
    }

    fn row(label: &str, seats: Vec<SeatInput>) -> RowInput {
        RowInput { row: Some(label.into()), seats: Some(seats) }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn layout_seats_default_to_available() {
        let layout = build_layout(Some(vec![row("A", vec![seat("A1", "balcony", 300.0)])])).unwrap();
        assert_eq!(layout[0].seats[0].category, SeatCategory::Balcony);
        assert!(layout[0].seats[0].available);
    }

    #[test]
    fn layout_rejects_bad_input() {
        assert!(message(build_layout(None).unwrap_err()).contains("'row' and 'seats'"));

        let err = build_layout(Some(vec![row("A", vec![seat("A1", "vip", 300.0)])])).unwrap_err();
        assert_eq!(message(err), "Invalid category. Valid categories are: balcony, firstclass, secondclass.");

        let err = build_layout(Some(vec![row("A", vec![seat("A1", "balcony", 0.0)])])).unwrap_err();
        assert!(message(err).contains("number, category, and price"));

        let err = build_layout(Some(vec![row("A", vec![]), row("A", vec![])])).unwrap_err();
        assert!(message(err).contains("Duplicate row"));

        let err = build_layout(Some(vec![row(
            "A",
            vec![seat("A1", "balcony", 300.0), seat("A1", "balcony", 300.0)],
        )]))
        .unwrap_err();
        assert!(message(err).contains("Duplicate seat"));
    }

    #[test]
    fn showtimes_must_be_strings() {
        assert_eq!(time_slots(json!(["10:00 AM"])).unwrap(), vec!["10:00 AM".to_string()]);
        assert!(time_slots(json!("10:00 AM")).is_err());
        assert!(time_slots(json!(["10:00 AM", 18])).is_err());
    }

    #[test]
    fn theater_request_requires_location_fields() {
        let req: CreateTheaterRequest =
            serde_json::from_value(json!({ "id": "t1", "name": "PVR", "location": { "city": "Chennai" } })).unwrap();
        let err: AppError = req.validate().unwrap_err().into();
        assert_eq!(message(err), "Missing required fields for theater details.");
    }
}
