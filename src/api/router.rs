use axum::{routing::post, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/check", post(handlers::check_media))
        .route("/download", post(handlers::download_media))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
