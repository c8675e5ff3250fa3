use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// A message submitted through the contact form.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a new contact message.
#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// Query parameters for the admin message listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MessageQueryParams {
    /// Substring match over name, email, subject and message
    pub search: Option<String>,
    /// Only include messages submitted on or after this date (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Only include messages submitted on or before this date (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
    /// Maximum number of messages to return (default: 50, max: 500)
    pub limit: Option<i64>,
    /// Number of messages to skip (for pagination)
    pub offset: Option<i64>,
}
