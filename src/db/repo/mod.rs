//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `players.rs` - Player catalog and price series
//! - `portfolios.rs` - Portfolio balances and holdings
//! - `transactions.rs` - Trade log
//!
//! Session lookups live here since they are a single table.

mod players;
mod portfolios;
mod transactions;

pub use players::{AppendOutcome, PlayerProfile};
pub use transactions::TransactionFilter;

use crate::domain::{Decimal, TimeMs, UserId};
use sha2::{Digest, Sha256};
use sqlx::sqlite::{Sqlite, SqlitePool};
use sqlx::Row;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Start a transaction for a multi-statement unit of work.
    ///
    /// Dropping the returned transaction without committing rolls it back.
    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    /// Register a session token for a user. Only the token's hash is stored.
    ///
    /// Re-registering an existing token replaces its owner and expiry.
    pub async fn insert_session(
        &self,
        token: &str,
        user_id: &UserId,
        expires_at: Option<TimeMs>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at_ms)
            VALUES (?, ?, ?)
            ON CONFLICT(token_hash) DO UPDATE SET
                user_id = excluded.user_id,
                expires_at_ms = excluded.expires_at_ms
            "#,
        )
        .bind(hash_token(token))
        .bind(user_id.as_str())
        .bind(expires_at.map(|t| t.as_ms()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Resolve a session token to its user, ignoring expired sessions.
    pub async fn find_session_user(
        &self,
        token: &str,
        now: TimeMs,
    ) -> Result<Option<UserId>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id
            FROM sessions
            WHERE token_hash = ? AND (expires_at_ms IS NULL OR expires_at_ms > ?)
            "#,
        )
        .bind(hash_token(token))
        .bind(now.as_ms())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UserId::new(r.get::<String, _>("user_id"))))
    }
}

/// Hex SHA-256 of a session token, as stored in `sessions.token_hash`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn parse_decimal(column: &str, value: &str) -> Result<Decimal, sqlx::Error> {
    Decimal::from_str_canonical(value).map_err(|e| {
        sqlx::Error::Decode(format!("invalid decimal in {}: {:?} ({})", column, value, e).into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    pub(super) async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let h = hash_token("secret");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_token("secret"));
        assert_ne!(h, hash_token("Secret"));
    }

    #[test]
    fn test_parse_decimal_reports_column() {
        let err = parse_decimal("balance", "abc").unwrap_err();
        assert!(err.to_string().contains("balance"));
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let (repo, _temp) = setup_test_db().await;
        let user = UserId::new("user-1".to_string());

        repo.insert_session("tok", &user, None).await.unwrap();

        let found = repo.find_session_user("tok", TimeMs::new(0)).await.unwrap();
        assert_eq!(found, Some(user));
        let missing = repo.find_session_user("other", TimeMs::new(0)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_ignored() {
        let (repo, _temp) = setup_test_db().await;
        let user = UserId::new("user-1".to_string());

        repo.insert_session("tok", &user, Some(TimeMs::new(5000)))
            .await
            .unwrap();

        assert!(repo
            .find_session_user("tok", TimeMs::new(4999))
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_session_user("tok", TimeMs::new(5000))
            .await
            .unwrap()
            .is_none());
    }
}
