use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::search::{search_key, SEARCH_TTL_SECONDS};
use crate::error::{AppError, AppResult};
use crate::models::SeatingLayout;
use crate::services::catalog::SearchFilters;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/theater", get(list_theaters))
        .route("/theater/{id}", get(get_theater))
        .route("/theater/{id}/movie/{movie_id}/showtime", get(get_showtime_layout))
        .route("/search", get(search_theaters))
}

fn json_with_cache_status(body: String, status: &'static str) -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Cache", status)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

// GET /theater
async fn list_theaters(State(state): State<Arc<AppState>>) -> AppResult<Response> {
    if let Some(cache) = &state.cache {
        if let Some(theaters) = cache.get_theaters().await {
            return Ok(([("X-Cache", "HIT")], Json(theaters)).into_response());
        }
    }

    let theaters = state.catalog.list_theaters().await?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.save_theaters(&theaters).await {
            tracing::error!("Failed to cache theaters: {:?}", e);
        }
        return Ok(([("X-Cache", "MISS")], Json(theaters)).into_response());
    }
    Ok(Json(theaters).into_response())
}

// GET /theater/{id}
async fn get_theater(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let theater = state.catalog.get_theater(&id).await?;
    Ok(Json(theater))
}

#[derive(Debug, Deserialize)]
struct ShowtimeQuery {
    date: Option<String>,
    time: Option<String>,
}

#[derive(Debug, Serialize)]
struct ShowtimeLayoutResponse {
    #[serde(rename = "movieId")]
    movie_id: String,
    date: String,
    time: String,
    seating_layout: SeatingLayout,
}

// GET /theater/{id}/movie/{movie_id}/showtime?date=dd-mm-yyyy&time=6:00 PM
async fn get_showtime_layout(
    State(state): State<Arc<AppState>>,
    Path((id, movie_id)): Path<(String, String)>,
    query: Result<Query<ShowtimeQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let (Some(date), Some(time)) = (params.date, params.time) else {
        return Err(AppError::Validation("Both date (dd-mm-yyyy) and time are required.".into()));
    };

    let seating_layout = state.catalog.showtime_layout(&id, &movie_id, &date, &time).await?;

    Ok(Json(ShowtimeLayoutResponse {
        movie_id,
        date,
        time,
        seating_layout,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    city: Option<String>,
    title: Option<String>,
    language: Option<String>,
    date: Option<String>,
}

// GET /search?city=&title=&language=&date=
async fn search_theaters(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(params) = query?;
    // Пустые параметры считаем отсутствующими
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let filters = SearchFilters {
        city: params.city.unwrap_or_default(),
        title: non_empty(params.title),
        language: non_empty(params.language),
        date: non_empty(params.date),
    };

    let cache_key = search_key(
        &filters.city,
        filters.title.as_deref(),
        filters.language.as_deref(),
        filters.date.as_deref(),
    );

    if let Some(cache) = &state.cache {
        if let Ok(Some(cached_json)) = cache.get_cached_search(&cache_key).await {
            return Ok(json_with_cache_status(cached_json, "HIT"));
        }
    }

    // Промахи (404) не кешируются
    let theaters = state.catalog.search(&filters).await?;

    if let Some(cache) = &state.cache {
        if let Ok(json_str) = serde_json::to_string(&theaters) {
            if let Err(e) = cache.cache_search_result(&cache_key, &json_str, SEARCH_TTL_SECONDS).await {
                tracing::error!("Failed to cache search result: {:?}", e);
            }
            return Ok(json_with_cache_status(json_str, "MISS"));
        }
    }

    Ok(Json(theaters).into_response())
}
