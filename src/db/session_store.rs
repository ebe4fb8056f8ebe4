use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::AppError;
use crate::models::{Session, User};

/// Persists the single active session across restarts.
#[derive(Clone, Debug)]
pub struct SessionStore {
    db: SqlitePool,
}

#[derive(Debug, FromRow)]
struct SessionRow {
    token: String,
    user_id: String,
    email: String,
    name: String,
}

impl SessionStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(1);
        if is_memory_url(database_url) {
            // An in-memory database lives exactly as long as its connection.
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        Self::from_pool(pool).await
    }

    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect("sqlite::memory:").await
    }

    pub async fn from_pool(db: SqlitePool) -> Result<Self, AppError> {
        sqlx::migrate!("./migrations").run(&db).await?;
        Ok(Self { db })
    }

    pub async fn load(&self) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT token, user_id, email, name FROM session WHERE id = 1",
        )
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| Session {
            token: r.token,
            user: User {
                id: r.user_id,
                email: r.email,
                name: r.name,
            },
        }))
    }

    pub async fn save(&self, session: &Session) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO session (id, token, user_id, email, name, saved_at)
            VALUES (1, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                user_id = excluded.user_id,
                email = excluded.email,
                name = excluded.name,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(&session.token)
        .bind(&session.user.id)
        .bind(&session.user.email)
        .bind(&session.user.name)
        .bind(now)
        .execute(&self.db)
        .await?;
        debug!("session saved for {}", session.user.email);
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM session").execute(&self.db).await?;
        Ok(())
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
