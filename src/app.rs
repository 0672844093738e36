use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/servings",
            get(handlers::list_servings).post(handlers::add_serving),
        )
        .route("/servings/:name", delete(handlers::delete_serving))
        .route("/archive", post(handlers::archive))
        .route("/reset", post(handlers::reset))
        .route("/dataformodel/:period", get(handlers::actual))
        .route("/predicted/:period", get(handlers::predicted))
        .route("/chart/:period", get(handlers::chart))
        .route("/metrics/:period", get(handlers::metrics))
        .route(
            "/events",
            get(handlers::list_events).post(handlers::add_event),
        )
        .route("/events/:id", delete(handlers::delete_event))
        .route("/recalibrate", post(handlers::recalibrate))
        .fallback(handlers::api_not_found)
}

/// API under `/api`; everything else is the dashboard build in `static_dir`,
/// with unknown paths answered by its `index.html`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let dashboard =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api_router())
        .fallback_service(dashboard)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
