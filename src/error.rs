use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::services::showtimes::ShowtimeError;
use crate::store::StoreError;

/// Сущность, которую не удалось найти при навигации по документу.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Theater,
    Movie,
    Showtime,
    Row,
    Seat,
}

impl Entity {
    pub fn not_found_message(&self) -> &'static str {
        match self {
            Entity::Theater => "Theater not found with the given ID.",
            Entity::Movie => "Movie not found with the given ID.",
            Entity::Showtime => "Showtime not found for the given date and time.",
            Entity::Row => "Row not found in the seating layout.",
            Entity::Seat => "Seat not found in the row.",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Theater => "theater",
            Entity::Movie => "movie",
            Entity::Showtime => "showtime",
            Entity::Row => "row",
            Entity::Seat => "seat",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("A theater with this ID already exists.")]
    DuplicateTheater,
    #[error("{0} not found")]
    NotFound(Entity),
    /// Поиск без результатов; сообщение перечисляет применённые фильтры.
    #[error("{0}")]
    NoResults(String),
    /// Место существовало при чтении, но условная запись ничего не изменила.
    #[error("Seat availability could not be updated.")]
    UpdateFailed,
    #[error("Invalid API Key")]
    Unauthorized,
    #[error("Too many booking attempts from this IP, please try again later.")]
    RateLimited,
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<ShowtimeError> for AppError {
    fn from(e: ShowtimeError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

// Первое сообщение, включая вложенные структуры и списки
fn first_message(errors: &ValidationErrors) -> Option<String> {
    errors.errors().values().find_map(|kind| match kind {
        ValidationErrorsKind::Field(errs) => errs
            .iter()
            .find_map(|e| e.message.as_ref().map(|m| m.to_string())),
        ValidationErrorsKind::Struct(inner) => first_message(inner),
        ValidationErrorsKind::List(items) => items.values().find_map(|inner| first_message(inner)),
    })
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(first_message(&errors).unwrap_or_else(|| errors.to_string()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DuplicateTheater => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NotFound(entity) => (StatusCode::NOT_FOUND, entity.not_found_message().to_string()),
            AppError::NoResults(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::UpdateFailed => (StatusCode::CONFLICT, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::Storage(e) => {
                error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
