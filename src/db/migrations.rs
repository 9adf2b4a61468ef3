//! データベースマイグレーション実行

use crate::common::error::ShardError;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};

/// SQLiteデータベース接続プールを作成してマイグレーションを実行
///
/// # Arguments
/// * `database_url` - データベースURL（例: "sqlite:shards.db"）
///
/// # Returns
/// * `Ok(SqlitePool)` - 初期化済みデータベースプール
/// * `Err(ShardError)` - 初期化失敗
pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, ShardError> {
    // データベースファイルが存在しない場合は作成
    if !Sqlite::database_exists(database_url)
        .await
        .map_err(|e| ShardError::Database(format!("Failed to check database: {}", e)))?
    {
        tracing::info!("Creating database: {}", database_url);
        Sqlite::create_database(database_url)
            .await
            .map_err(|e| ShardError::Database(format!("Failed to create database: {}", e)))?;
    }

    let pool = SqlitePool::connect(database_url)
        .await
        .map_err(|e| ShardError::Database(format!("Failed to connect to database: {}", e)))?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// マイグレーションを実行（sqlx::migrate!マクロを使用）
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), ShardError> {
    tracing::info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| ShardError::Database(format!("Failed to run migrations: {}", e)))?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_database() {
        let pool = initialize_database("sqlite::memory:")
            .await
            .expect("Failed to initialize database");

        // shardsテーブルが作成されているか確認
        let result =
            sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='shards'")
                .fetch_one(&pool)
                .await;

        assert!(result.is_ok(), "shards table should exist");
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        // Running twice should not error
        run_migrations(&pool).await.unwrap();

        let result =
            sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='shards'")
                .fetch_one(&pool)
                .await;
        assert!(result.is_ok());
    }
}
