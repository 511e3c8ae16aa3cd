//! Database module
//!
//! A single-table SQLite store behind an sqlx pool. The pool is capped at
//! one connection so the whole server shares a single serialized handle,
//! matching the original deployment.
//!
//! Two lookup variants exist side by side on purpose: the parameterized one
//! and the string-concatenated one. Which the `/user` endpoint uses is a
//! configuration decision, not a code decision; see `SecurityConfig`.

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};

use crate::logger;

/// One row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub name: String,
    pub age: i64,
}

/// Open (creating if missing) the database file and bootstrap the schema
pub async fn init(database_path: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(database_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    ensure_schema(&pool).await?;
    logger::log_info(&format!("SQLite database ready at {database_path}"));
    Ok(pool)
}

/// Create the `users` table if it does not exist
///
/// No primary key, no constraints beyond column types; the table is part of
/// the teaching surface.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE TABLE IF NOT EXISTS users (name TEXT, age INTEGER)")
        .execute(pool)
        .await?;
    Ok(())
}

/// Lookup with a bound parameter (the mitigated variant)
pub async fn find_users_parameterized(
    pool: &SqlitePool,
    name: &str,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT name, age FROM users WHERE name = ?")
        .bind(name)
        .fetch_all(pool)
        .await
}

/// Lookup by concatenating the value into the SQL text (the vulnerable
/// teaching variant; `name = ' OR '1'='1` returns every row)
pub async fn find_users_concatenated(
    pool: &SqlitePool,
    name: &str,
) -> Result<Vec<User>, sqlx::Error> {
    let sql = format!("SELECT name, age FROM users WHERE name = '{name}'");
    sqlx::query_as::<_, User>(&sql).fetch_all(pool).await
}

/// Insert a user row; always bound parameters
pub async fn insert_user(pool: &SqlitePool, name: &str, age: i64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO users (name, age) VALUES (?, ?)")
        .bind(name)
        .bind(age)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    async fn count_users(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let pool = test_pool().await;
        insert_user(&pool, "Alice", 30).await.unwrap();

        let rows = find_users_parameterized(&pool, "Alice").await.unwrap();
        assert_eq!(
            rows,
            vec![User {
                name: "Alice".to_string(),
                age: 30
            }]
        );
    }

    #[tokio::test]
    async fn test_lookup_missing_user() {
        let pool = test_pool().await;
        insert_user(&pool, "Alice", 30).await.unwrap();

        let rows = find_users_parameterized(&pool, "NoSuchUser").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_allowed() {
        // No uniqueness constraint on the table
        let pool = test_pool().await;
        insert_user(&pool, "Alice", 30).await.unwrap();
        insert_user(&pool, "Alice", 31).await.unwrap();

        let rows = find_users_parameterized(&pool, "Alice").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(count_users(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_parameterized_treats_injection_as_literal() {
        let pool = test_pool().await;
        insert_user(&pool, "Alice", 30).await.unwrap();
        insert_user(&pool, "Bob", 40).await.unwrap();

        let rows = find_users_parameterized(&pool, "' OR '1'='1")
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_concatenated_variant_is_injectable() {
        let pool = test_pool().await;
        insert_user(&pool, "Alice", 30).await.unwrap();
        insert_user(&pool, "Bob", 40).await.unwrap();

        // The classic payload dumps the whole table
        let rows = find_users_concatenated(&pool, "' OR '1'='1")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = test_pool().await;
        ensure_schema(&pool).await.unwrap();
        insert_user(&pool, "Alice", 30).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        assert_eq!(count_users(&pool).await, 1);
    }
}
