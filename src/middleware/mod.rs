use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;

use crate::{error::AppError, AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Доступ по общему API-ключу: `?apikey=` или заголовок `x-api-key`.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

#[derive(Deserialize)]
struct ApiKeyQuery {
    apikey: Option<String>,
}

fn provided_key(parts: &Parts) -> Option<String> {
    // Параметр запроса важнее заголовка
    let from_query = parts
        .uri
        .query()
        .and_then(|q| serde_urlencoded::from_str::<ApiKeyQuery>(q).ok())
        .and_then(|q| q.apikey);

    from_query.or_else(|| {
        parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    })
}

impl FromRequestParts<Arc<AppState>> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.features.enable_auth {
            return Ok(ApiKey);
        }

        let expected = state.config.auth.api_key.as_deref().ok_or(AppError::Unauthorized)?;
        match provided_key(parts) {
            Some(key) if key == expected => Ok(ApiKey),
            _ => {
                warn!("Rejected request to {} with invalid API key", parts.uri.path());
                Err(AppError::Unauthorized)
            }
        }
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

/// Адрес клиента для лимитера: адрес соединения, затем `X-Forwarded-For`.
pub fn client_address(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .or_else(|| forwarded_for(request.headers()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Слой для изменения мест: сначала ключ (неверный ключ не тратит попытки),
/// затем лимит попыток с адреса.
pub async fn guard_seat_updates(
    State(state): State<Arc<AppState>>,
    _key: ApiKey,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if state.config.features.enable_rate_limiting {
        let client = client_address(&request);
        if !state.rate_limiter.allow(&client).await {
            warn!("Seat update rate limit exceeded for {}", client);
            return Err(AppError::RateLimited);
        }
    }
    Ok(next.run(request).await)
}
