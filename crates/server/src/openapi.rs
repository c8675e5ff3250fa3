use axum::Json;
use utoipa::OpenApi;

use crate::api::handlers::{AdminOverview, MarkHandledRequest};
use crate::models::ContactMessage;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vidox API",
        version = "1.0.0"
    ),
    tags(
        (name = "admin", description = "Contact message administration endpoints")
    ),
    components(schemas(
        ContactMessage,
        AdminOverview,
        MarkHandledRequest
    ))
)]
pub struct ApiDoc;

/// GET /api/openapi.json
pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
