pub mod admin;
pub mod theaters;

use axum::Router;
use std::sync::Arc;

pub fn routes(state: Arc<crate::AppState>) -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(theaters::routes())
        .merge(admin::routes(state))
}
