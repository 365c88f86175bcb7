use async_trait::async_trait;
use sqlx::{Executor, MySql, Pool};

use crate::modules::monitor::model::CheckResultRecord;
use crate::services::checker::CheckResult;
use crate::services::storage::{ResultStore, StorageError};

/// MySQL-backed persistence for check results
#[derive(Clone)]
pub struct CheckResultCrud {
    pool: Pool<MySql>,
}

impl CheckResultCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn insert<'e, E>(executor: E, result: &CheckResult) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO check_results (url, status_code, response_time_ms, is_healthy, error_message, checked_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.url)
        .bind(result.status_code as i32)
        .bind(i32::try_from(result.response_time_ms()).unwrap_or(i32::MAX))
        .bind(result.is_healthy)
        .bind(result.error.as_deref())
        .bind(result.checked_at)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Rows for `url`, newest first
    pub async fn find_recent(&self, url: &str, limit: u32) -> Result<Vec<CheckResultRecord>, sqlx::Error> {
        sqlx::query_as::<_, CheckResultRecord>(
            r#"
            SELECT id, url, status_code, response_time_ms, is_healthy, error_message, checked_at
            FROM check_results
            WHERE url = ?
            ORDER BY checked_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(url)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl ResultStore for CheckResultCrud {
    async fn save(&self, result: &CheckResult) -> Result<(), StorageError> {
        Self::insert(&self.pool, result).await?;
        Ok(())
    }

    async fn save_batch(&self, results: &[CheckResult]) -> Result<(), StorageError> {
        if results.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for result in results {
            Self::insert(&mut *tx, result).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn query_recent(&self, url: &str, limit: u32) -> Result<Vec<CheckResult>, StorageError> {
        self.find_recent(url, limit)
            .await?
            .into_iter()
            .map(CheckResult::try_from)
            .collect()
    }
}
