use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use mailduet_core::domain::session::{DemoSession, NewSession};

use super::{parse_timestamp, RepositoryError, SessionRepository};
use crate::DbPool;

pub struct SqlSessionRepository {
    pool: DbPool,
}

impl SqlSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, session_id: i64) -> Result<DemoSession, RepositoryError> {
        let row = sqlx::query("SELECT * FROM demo_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_session(&row),
            None => Err(RepositoryError::SessionMissing { session_id }),
        }
    }
}

#[async_trait::async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn create(&self, new_session: NewSession) -> Result<DemoSession, RepositoryError> {
        let created_at = Utc::now();

        // Replace semantics: the delete and the insert commit together so a
        // crash can never leave zero-or-two active sessions visible.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM demo_sessions").execute(&mut *tx).await?;
        let inserted = sqlx::query(
            "INSERT INTO demo_sessions \
             (seller_inbox_id, seller_address, buyer_inbox_id, buyer_address, \
              exchange_count, max_exchanges, created_at) \
             VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(&new_session.seller_inbox_id)
        .bind(&new_session.seller_address)
        .bind(&new_session.buyer_inbox_id)
        .bind(&new_session.buyer_address)
        .bind(new_session.max_exchanges)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(DemoSession {
            id: inserted.last_insert_rowid(),
            seller_inbox_id: new_session.seller_inbox_id,
            seller_address: new_session.seller_address,
            buyer_inbox_id: new_session.buyer_inbox_id,
            buyer_address: new_session.buyer_address,
            exchange_count: 0,
            max_exchanges: new_session.max_exchanges,
            created_at,
        })
    }

    async fn active(&self) -> Result<Option<DemoSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM demo_sessions ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn increment_exchange(&self, session_id: i64) -> Result<DemoSession, RepositoryError> {
        let updated = sqlx::query(
            "UPDATE demo_sessions SET exchange_count = exchange_count + 1 \
             WHERE id = ? AND exchange_count < max_exchanges",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            // Either the session is gone or the cap guard held; tell them apart.
            return match self.fetch(session_id).await {
                Ok(_) => Err(RepositoryError::CapExceeded { session_id }),
                Err(error) => Err(error),
            };
        }

        self.fetch(session_id).await
    }
}

fn row_to_session(row: &SqliteRow) -> Result<DemoSession, RepositoryError> {
    let created_at_raw: String = row.get("created_at");
    Ok(DemoSession {
        id: row.get("id"),
        seller_inbox_id: row.get("seller_inbox_id"),
        seller_address: row.get("seller_address"),
        buyer_inbox_id: row.get("buyer_inbox_id"),
        buyer_address: row.get("buyer_address"),
        exchange_count: row.get("exchange_count"),
        max_exchanges: row.get("max_exchanges"),
        created_at: parse_timestamp(&created_at_raw)?,
    })
}

#[cfg(test)]
mod tests {
    use mailduet_core::domain::session::NewSession;

    use super::SqlSessionRepository;
    use crate::repositories::{RepositoryError, SessionRepository};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn pool() -> DbPool {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations should apply");
        pool
    }

    fn new_session(max_exchanges: i64) -> NewSession {
        NewSession {
            seller_inbox_id: "inbox-s".to_owned(),
            seller_address: "seller@demo.test".to_owned(),
            buyer_inbox_id: "inbox-b".to_owned(),
            buyer_address: "buyer@demo.test".to_owned(),
            max_exchanges,
        }
    }

    #[tokio::test]
    async fn create_then_active_round_trips_the_session() {
        let pool = pool().await;
        let repo = SqlSessionRepository::new(pool.clone());

        let created = repo.create(new_session(6)).await.expect("create should succeed");
        let active = repo.active().await.expect("query should succeed").expect("session exists");

        assert_eq!(active, created);
        assert_eq!(active.exchange_count, 0);
        pool.close().await;
    }

    #[tokio::test]
    async fn creating_a_second_session_replaces_the_first() {
        let pool = pool().await;
        let repo = SqlSessionRepository::new(pool.clone());

        let first = repo.create(new_session(6)).await.expect("first create");
        let mut replacement = new_session(4);
        replacement.seller_inbox_id = "inbox-s2".to_owned();
        let second = repo.create(replacement).await.expect("second create");

        let active = repo.active().await.expect("query").expect("session exists");
        assert_eq!(active.id, second.id);
        assert_ne!(active.id, first.id);
        assert_eq!(active.seller_inbox_id, "inbox-s2");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM demo_sessions")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 1, "replace should leave exactly one session row");
        pool.close().await;
    }

    #[tokio::test]
    async fn increment_stops_exactly_at_the_cap() {
        let pool = pool().await;
        let repo = SqlSessionRepository::new(pool.clone());
        let session = repo.create(new_session(2)).await.expect("create");

        let one = repo.increment_exchange(session.id).await.expect("first increment");
        assert_eq!(one.exchange_count, 1);
        let two = repo.increment_exchange(session.id).await.expect("second increment");
        assert_eq!(two.exchange_count, 2);

        let capped = repo.increment_exchange(session.id).await;
        assert!(matches!(capped, Err(RepositoryError::CapExceeded { .. })));

        let after = repo.active().await.expect("query").expect("session exists");
        assert_eq!(after.exchange_count, 2, "failed increment must not move the counter");
        pool.close().await;
    }

    #[tokio::test]
    async fn increment_on_missing_session_reports_session_missing() {
        let pool = pool().await;
        let repo = SqlSessionRepository::new(pool.clone());

        let result = repo.increment_exchange(999).await;
        assert!(matches!(result, Err(RepositoryError::SessionMissing { session_id: 999 })));
        pool.close().await;
    }
}
