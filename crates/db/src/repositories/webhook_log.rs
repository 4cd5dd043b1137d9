use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{parse_timestamp, RepositoryError, WebhookLogEntry, WebhookLogRepository};
use crate::DbPool;

pub struct SqlWebhookLogRepository {
    pool: DbPool,
}

impl SqlWebhookLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WebhookLogRepository for SqlWebhookLogRepository {
    async fn record(&self, entry: WebhookLogEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO webhook_events \
             (id, event_id, inbox_id, sender, subject, outcome, detail, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.event_id)
        .bind(&entry.inbox_id)
        .bind(&entry.sender)
        .bind(&entry.subject)
        .bind(&entry.outcome)
        .bind(&entry.detail)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<WebhookLogEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM webhook_events ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<WebhookLogEntry, RepositoryError> {
    let created_at_raw: String = row.get("created_at");
    Ok(WebhookLogEntry {
        id: row.get("id"),
        event_id: row.get("event_id"),
        inbox_id: row.get("inbox_id"),
        sender: row.get("sender"),
        subject: row.get("subject"),
        outcome: row.get("outcome"),
        detail: row.get("detail"),
        created_at: parse_timestamp(&created_at_raw)?,
    })
}
