use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::User;

const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

/// Local client storage. Holds the last session this client was granted so it
/// can be resumed on the next start.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct SavedSession {
    pub user: User,
    pub saved_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database sees its own empty database.
        let max_connections = if database_url.starts_with(MEMORY_DATABASE_URL) {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open client database '{database_url}'"))?;
        let storage = Self { pool };
        storage.ensure_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_session (
                slot       INTEGER PRIMARY KEY CHECK (slot = 1),
                user_id    TEXT NOT NULL,
                session_id TEXT NOT NULL,
                username   TEXT NOT NULL,
                saved_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure saved_session table exists")?;
        Ok(())
    }

    /// Replaces the saved session with `user`.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "INSERT INTO saved_session (slot, user_id, session_id, username, saved_at)
             VALUES (1, ?, ?, ?, ?)
             ON CONFLICT(slot) DO UPDATE SET
                user_id = excluded.user_id,
                session_id = excluded.session_id,
                username = excluded.username,
                saved_at = excluded.saved_at",
        )
        .bind(&user.user_id)
        .bind(&user.session_id)
        .bind(&user.username)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("failed to save session user")?;
        debug!(session_id = %user.session_id, "storage: session user saved");
        Ok(())
    }

    pub async fn load_saved_session(&self) -> Result<Option<SavedSession>> {
        let row = sqlx::query(
            "SELECT user_id, session_id, username, saved_at FROM saved_session WHERE slot = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .context("failed to load saved session")?;

        row.map(|row| -> Result<SavedSession> {
            Ok(SavedSession {
                user: User {
                    user_id: row.try_get("user_id")?,
                    session_id: row.try_get("session_id")?,
                    username: row.try_get("username")?,
                },
                saved_at: row.try_get("saved_at")?,
            })
        })
        .transpose()
    }

    /// Session id of the saved user, if one was saved and it is non-empty.
    pub async fn stored_session_id(&self) -> Result<Option<String>> {
        Ok(self
            .load_saved_session()
            .await?
            .map(|saved| saved.user.session_id)
            .filter(|session_id| !session_id.is_empty()))
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with(MEMORY_DATABASE_URL) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
