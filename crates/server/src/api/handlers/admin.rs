use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::{ContactMessage, MessageQueryParams};
use crate::repositories::MessageRepository;
use crate::state::AppState;

/// How many recent messages the overview returns
const OVERVIEW_RECENT_LIMIT: i64 = 6;

/// Dashboard snapshot for the admin UI
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverview {
    pub total_messages: i64,
    pub last_24h: i64,
    pub recent: Vec<ContactMessage>,
}

/// Request body for marking messages as handled
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkHandledRequest {
    pub ids: Vec<i64>,
}

/// List contact messages with optional search and date filters
#[utoipa::path(
    get,
    path = "/api/admin/messages",
    tag = "admin",
    params(MessageQueryParams),
    responses(
        (status = 200, description = "Messages retrieved successfully", body = Vec<ContactMessage>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageQueryParams>,
) -> AppResult<Json<Vec<ContactMessage>>> {
    let messages = MessageRepository::list(&state.db, params).await?;
    Ok(Json(messages))
}

/// Export all contact messages as CSV
#[utoipa::path(
    get,
    path = "/api/admin/messages/export",
    tag = "admin",
    responses(
        (status = 200, description = "CSV export of all messages", content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn export_messages(State(state): State<AppState>) -> AppResult<Response> {
    let messages = MessageRepository::export_all(&state.db).await?;

    let mut csv = String::from("id,name,email,subject,message,created_at\r\n");
    for message in &messages {
        let fields = [
            message.id.to_string(),
            message.name.clone(),
            message.email.clone(),
            message.subject.clone().unwrap_or_default(),
            message.message.clone(),
            message.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        csv.push_str(&csv_record(&fields));
    }

    let filename = format!(
        "contact_messages_export_{}.csv",
        Utc::now().format("%Y%m%d_%H%M%S")
    );
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(response)
}

/// Mark messages as handled.
///
/// The messages table has no handled flag, so this only acknowledges how
/// many of the requested messages exist.
// TODO: persist a handled flag once the column lands
#[utoipa::path(
    post,
    path = "/api/admin/messages/mark-handled",
    tag = "admin",
    request_body = MarkHandledRequest,
    responses(
        (status = 200, description = "Acknowledgement text", body = String),
        (status = 400, description = "Empty id list")
    )
)]
pub async fn mark_handled(
    State(state): State<AppState>,
    Json(request): Json<MarkHandledRequest>,
) -> AppResult<String> {
    if request.ids.is_empty() {
        return Err(AppError::bad_request("No message ids given."));
    }

    let count = MessageRepository::count_by_ids(&state.db, &request.ids).await?;
    Ok(format!("{} messages marked as handled (placeholder).", count))
}

/// Dashboard overview: totals plus the latest messages
#[utoipa::path(
    get,
    path = "/api/admin/overview",
    tag = "admin",
    responses(
        (status = 200, description = "Overview retrieved successfully", body = AdminOverview),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn admin_overview(State(state): State<AppState>) -> AppResult<Json<AdminOverview>> {
    let total_messages = MessageRepository::count(&state.db).await?;
    let last_24h = MessageRepository::count_since_hours(&state.db, 24).await?;
    let recent = MessageRepository::recent(&state.db, OVERVIEW_RECENT_LIMIT).await?;

    Ok(Json(AdminOverview {
        total_messages,
        last_24h,
        recent,
    }))
}

// RFC 4180 wants CRLF record terminators
fn csv_record(fields: &[String]) -> String {
    let mut record = fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",");
    record.push_str("\r\n");
    record
}

/// RFC 4180 quoting: fields holding commas, quotes or line breaks get
/// wrapped, with inner quotes doubled.
fn csv_field(field: &str) -> String {
    if field
        .chars()
        .any(|c| matches!(c, '"' | ',' | '\n' | '\r'))
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::to_bytes;

    use crate::config::Config;
    use crate::db::create_pool;
    use crate::models::CreateMessage;

    struct NoopExtractor;

    #[async_trait::async_trait]
    impl extractor::Extractor for NoopExtractor {
        async fn extract(
            &self,
            _url: &str,
            _options: &extractor::ExtractionOptions,
        ) -> extractor::Result<extractor::ExtractionOutcome> {
            Err(extractor::ExtractorError::Failed(
                "not available in tests".to_string(),
            ))
        }

        fn extractor_type(&self) -> &'static str {
            "noop"
        }
    }

    async fn test_state() -> AppState {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        let config = Config::new(
            "sqlite::memory:".to_string(),
            std::env::temp_dir().join("vidox-admin-tests"),
        );
        AppState::with_extractor(pool, config, Arc::new(NoopExtractor))
    }

    async fn seed(state: &AppState, name: &str, message: &str) -> ContactMessage {
        MessageRepository::create(
            &state.db,
            CreateMessage {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                subject: None,
                message: message.to_string(),
            },
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_csv_record_terminates_with_crlf() {
        assert_eq!(
            csv_record(&["1".to_string(), "a,b".to_string()]),
            "1,\"a,b\"\r\n"
        );
    }

    #[tokio::test]
    async fn test_export_contains_header_and_quoted_rows() {
        let state = test_state().await;
        seed(&state, "Ann", "plain text").await;
        seed(&state, "Bob", "hello, world").await;

        let response = export_messages(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers().clone();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/csv");
        let disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(disposition.starts_with("attachment; filename=\"contact_messages_export_"));
        assert!(disposition.ends_with(".csv\""));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("id,name,email,subject,message,created_at\r\n"));
        assert!(text.ends_with("\r\n"));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("\"hello, world\""));
        assert!(text.contains("Ann"));
    }

    #[tokio::test]
    async fn test_mark_handled_reports_existing_count() {
        let state = test_state().await;
        let a = seed(&state, "Ann", "x").await;
        let b = seed(&state, "Bob", "y").await;

        let ack = mark_handled(
            State(state.clone()),
            Json(MarkHandledRequest {
                ids: vec![a.id, b.id, 9999],
            }),
        )
        .await
        .unwrap();
        assert_eq!(ack, "2 messages marked as handled (placeholder).");

        let err = mark_handled(State(state), Json(MarkHandledRequest { ids: vec![] }))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_overview_counts_and_recent_messages() {
        let state = test_state().await;
        for i in 1..=7 {
            seed(&state, &format!("User{}", i), "hi").await;
        }

        let Json(overview) = admin_overview(State(state)).await.unwrap();
        assert_eq!(overview.total_messages, 7);
        assert_eq!(overview.last_24h, 7);
        assert_eq!(overview.recent.len(), 6);
        assert_eq!(overview.recent[0].name, "User7");
        assert_eq!(overview.recent[5].name, "User2");
    }
}
