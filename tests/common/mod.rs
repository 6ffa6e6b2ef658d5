use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use showtic::{app, config::Config, AppState};
use std::sync::Arc;
use tower::ServiceExt;

pub const API_KEY: &str = "test-api-key";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::in_memory(API_KEY))
    }

    pub fn with_config(config: Config) -> Self {
        let state = AppState::in_memory(config);
        let router = app(state.clone());
        Self { router, state }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn get_raw(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn json(&self, method: &str, uri: &str, payload: Value) -> (StatusCode, Value) {
        self.send(json_request(method, uri, &payload)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()).await
    }

    /// Кинотеатр с залом 2 ряда по 2 места.
    pub async fn seed_theater(&self, id: &str, city: &str) {
        let (status, _) = self
            .json(
                "POST",
                "/admin/theater",
                json!({
                    "id": id,
                    "name": format!("Theater {}", id),
                    "location": { "address_line": "1 Main St", "city": city, "state": "TN", "pincode": "600001" },
                    "amenities": { "facilities": ["Parking"] }
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = self
            .json("POST", &format!("/admin/theater/{}/seating", id), seating_layout())
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    /// Добавляет фильм и возвращает его id.
    pub async fn seed_movie(&self, theater_id: &str, title: &str, start: &str, end: &str) -> String {
        let (status, body) = self
            .json(
                "POST",
                &format!("/admin/theater/{}/movie", theater_id),
                movie_payload(title, "Tamil", start, end, &["10:00 AM", "6:00 PM"]),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["movieId"].as_str().unwrap().to_string()
    }

    /// `PUT` смены доступности места с ключом в заголовке.
    pub async fn update_seat(
        &self,
        path: &str,
        row: &str,
        seat: &str,
        available: Value,
        key: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("PUT")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "198.51.100.1");
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        let payload = json!({ "row": row, "seatNumber": seat, "available": available });
        self.send(builder.body(Body::from(payload.to_string())).unwrap()).await
    }
}

pub fn json_request(method: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

pub fn seating_layout() -> Value {
    json!({
        "seating_layout": [
            { "row": "A", "seats": [
                { "number": "A1", "category": "balcony", "price": 300 },
                { "number": "A2", "category": "balcony", "price": 300 }
            ]},
            { "row": "B", "seats": [
                { "number": "B1", "category": "firstclass", "price": 200 },
                { "number": "B2", "category": "secondclass", "price": 150 }
            ]}
        ]
    })
}

pub fn movie_payload(title: &str, language: &str, start: &str, end: &str, times: &[&str]) -> Value {
    json!({
        "title": title,
        "genre": "Action",
        "duration": 150,
        "showtimes": times,
        "rating": "UA",
        "description": "A film",
        "poster": "https://example.com/poster.png",
        "start_date": start,
        "end_date": end,
        "language": language
    })
}

pub fn seat_path(theater_id: &str, movie_id: &str, date: &str, time: &str) -> String {
    format!(
        "/admin/theater/{}/movie/{}/showtime/{}/{}",
        theater_id,
        movie_id,
        date,
        time.replace(' ', "%20")
    )
}

pub fn layout_query(theater_id: &str, movie_id: &str, date: &str, time: &str) -> String {
    format!(
        "/theater/{}/movie/{}/showtime?date={}&time={}",
        theater_id,
        movie_id,
        date,
        time.replace(' ', "%20")
    )
}

/// Доступность места в ответе `GET .../showtime`.
pub fn seat_available(layout: &Value, row: &str, seat: &str) -> bool {
    layout["seating_layout"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["row"] == row)
        .and_then(|r| r["seats"].as_array().unwrap().iter().find(|s| s["number"] == seat))
        .map(|s| s["available"].as_bool().unwrap())
        .unwrap()
}
