use axum::Router;

use crate::openapi;
use crate::state::AppState;

use super::handlers;

pub fn create_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        // Site pages
        .route("/", get(handlers::index_page))
        .route("/about", get(handlers::about_page))
        .route(
            "/contact",
            get(handlers::contact_page).post(handlers::submit_contact),
        )
        // Download endpoints
        .route(
            "/download/video",
            get(handlers::download_video).post(handlers::download_video),
        )
        .route(
            "/download/audio",
            get(handlers::download_audio).post(handlers::download_audio),
        )
        // Admin endpoints
        .route("/api/admin/messages", get(handlers::list_messages))
        .route("/api/admin/messages/export", get(handlers::export_messages))
        .route(
            "/api/admin/messages/mark-handled",
            post(handlers::mark_handled),
        )
        .route("/api/admin/overview", get(handlers::admin_overview))
        // API documentation
        .route("/api/openapi.json", get(openapi::serve_openapi))
        .with_state(state)
}
