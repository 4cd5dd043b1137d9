use chrono::Utc;

use super::{ProcessedEventRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProcessedEventRepository {
    pool: DbPool,
}

impl SqlProcessedEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProcessedEventRepository for SqlProcessedEventRepository {
    async fn record_if_new(&self, event_id: &str) -> Result<bool, RepositoryError> {
        // INSERT OR IGNORE against the primary key is the whole dedup
        // protocol: rows_affected tells first-sight apart from replay in
        // the same statement that records it.
        let result =
            sqlx::query("INSERT OR IGNORE INTO processed_events (event_id, seen_at) VALUES (?, ?)")
                .bind(event_id)
                .bind(Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::SqlProcessedEventRepository;
    use crate::repositories::ProcessedEventRepository;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn first_sight_is_true_then_false_forever() {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");
        let repo = SqlProcessedEventRepository::new(pool.clone());

        assert!(repo.record_if_new("evt-1").await.expect("insert"));
        assert!(!repo.record_if_new("evt-1").await.expect("replay"));
        assert!(!repo.record_if_new("evt-1").await.expect("replay again"));
        assert!(repo.record_if_new("evt-2").await.expect("distinct event"));

        pool.close().await;
    }
}
