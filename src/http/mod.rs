use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::AppState;

mod auth;
mod error;
mod handlers;
mod routes;
mod ws;

pub use auth::{AuthCommunity, MasterAuth};
pub use error::ApiError;

const MAX_BODY_BYTES: usize = 256 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::reports())
        .merge(routes::profiles())
        .merge(routes::rules())
        .merge(routes::communities())
        .merge(routes::guilds())
        .merge(routes::webhooks())
        .merge(routes::websocket())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
