use sqlx::mysql::{MySqlPool, MySqlPoolOptions};

use crate::services::storage::StorageError;

/// Connect and bring the schema up to date.
pub async fn init_db(database_url: &str) -> Result<MySqlPool, StorageError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
