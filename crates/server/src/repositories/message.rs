use sqlx::SqlitePool;

use crate::models::{ContactMessage, CreateMessage, MessageQueryParams};

/// Common SELECT fields for message queries
const SELECT_MESSAGE: &str = r#"
    SELECT
        id, name, email, subject, message, created_at
    FROM contact_messages
"#;

pub struct MessageRepository;

impl MessageRepository {
    /// Store a new contact message
    pub async fn create(
        pool: &SqlitePool,
        data: CreateMessage,
    ) -> Result<ContactMessage, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.subject)
        .bind(&data.message)
        .fetch_one(pool)
        .await?;

        let id: i64 = sqlx::Row::get(&result, "id");
        Self::get_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Get a message by ID
    pub async fn get_by_id(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<ContactMessage>, sqlx::Error> {
        let query = format!("{} WHERE id = $1", SELECT_MESSAGE);
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List messages with optional filtering and pagination, newest first
    pub async fn list(
        pool: &SqlitePool,
        params: MessageQueryParams,
    ) -> Result<Vec<ContactMessage>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).min(500).max(1);
        let offset = params.offset.unwrap_or(0).max(0);

        // Build dynamic query; placeholder numbers follow the bind order below
        let mut conditions: Vec<String> = Vec::new();
        let mut next_param = 1;

        if params.search.is_some() {
            conditions.push(format!(
                r"(name LIKE ${n} ESCAPE '\' OR email LIKE ${n} ESCAPE '\' OR subject LIKE ${n} ESCAPE '\' OR message LIKE ${n} ESCAPE '\')",
                n = next_param
            ));
            next_param += 1;
        }
        if params.from.is_some() {
            conditions.push(format!("date(created_at) >= date(${})", next_param));
            next_param += 1;
        }
        if params.to.is_some() {
            conditions.push(format!("date(created_at) <= date(${})", next_param));
        }

        let mut query = SELECT_MESSAGE.to_string();
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY created_at DESC, id DESC");
        query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let mut statement = sqlx::query_as::<_, ContactMessage>(&query);
        if let Some(search) = &params.search {
            statement = statement.bind(format!("%{}%", escape_like(search)));
        }
        if let Some(from) = params.from {
            statement = statement.bind(from);
        }
        if let Some(to) = params.to {
            statement = statement.bind(to);
        }

        statement.fetch_all(pool).await
    }

    /// All messages, newest first (for CSV export)
    pub async fn export_all(pool: &SqlitePool) -> Result<Vec<ContactMessage>, sqlx::Error> {
        let query = format!("{} ORDER BY created_at DESC, id DESC", SELECT_MESSAGE);
        sqlx::query_as::<_, ContactMessage>(&query)
            .fetch_all(pool)
            .await
    }

    /// Get the most recent messages (for the dashboard overview)
    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<ContactMessage>, sqlx::Error> {
        let query = format!(
            "{} ORDER BY created_at DESC, id DESC LIMIT $1",
            SELECT_MESSAGE
        );
        sqlx::query_as::<_, ContactMessage>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count all messages
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_messages")
            .fetch_one(pool)
            .await?;

        Ok(row.0)
    }

    /// Count messages submitted within the given number of hours
    pub async fn count_since_hours(pool: &SqlitePool, hours: i64) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM contact_messages
            WHERE created_at >= datetime('now', '-' || $1 || ' hours')
            "#,
        )
        .bind(hours)
        .fetch_one(pool)
        .await?;

        Ok(row.0)
    }

    /// Count how many of the given IDs exist
    pub async fn count_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<i64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!(
            "SELECT COUNT(*) FROM contact_messages WHERE id IN ({})",
            placeholders
        );

        let mut statement = sqlx::query_as::<_, (i64,)>(&query);
        for id in ids {
            statement = statement.bind(id);
        }
        let row = statement.fetch_one(pool).await?;

        Ok(row.0)
    }
}

/// LIKE treats `%` and `_` as wildcards; escape them (and the escape
/// character itself) so a search term only ever matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
