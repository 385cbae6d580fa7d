pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;
use crate::web::middleware::{resolve_profile, USER_ID_HEADER};
use crate::web::state::AppState;

pub use rest::{
    export_roadmap_handler, generate_roadmap_handler, get_roadmap_handler, health_handler,
    list_roadmaps_handler, toggle_day_handler, toggle_item_handler,
};

/// Builds the API router (without the Swagger UI) for the given state.
pub fn build_router(app_state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = app_state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
        ]);

    // Roadmap routes act for the profile named by the x-user-id header.
    let roadmap_routes = Router::new()
        .route("/roadmaps", get(list_roadmaps_handler))
        .route("/roadmaps/generate", post(generate_roadmap_handler))
        .route("/roadmaps/{id}", get(get_roadmap_handler))
        .route("/roadmaps/{id}/days/toggle", post(toggle_day_handler))
        .route("/roadmaps/{id}/items/toggle", post(toggle_item_handler))
        .route("/roadmaps/{id}/export", get(export_roadmap_handler))
        .layer(axum_middleware::from_fn(resolve_profile));

    Ok(Router::new()
        .route("/health", get(health_handler))
        .merge(roadmap_routes)
        .layer(cors)
        .with_state(app_state))
}
