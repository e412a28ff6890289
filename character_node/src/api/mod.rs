// HTTP surface for character metadata and owner-signed updates

pub mod errors;
pub mod handlers;

use crate::service::CharacterService;
use axum::{
    http::Method,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CharacterService>,
}

impl AppState {
    pub fn new(service: Arc<CharacterService>) -> Self {
        Self { service }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metadata/characters", get(handlers::list_characters))
        .route(
            "/metadata/characters/:token_id",
            get(handlers::get_character).put(handlers::update_character),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
                .allow_headers(Any),
        )
        .with_state(state)
}
