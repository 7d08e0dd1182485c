use async_trait::async_trait;
use log::{debug, info};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{PgConnection, Postgres, Transaction};

use crate::error::{map_sqlx_error, Result};
use crate::models::{LessonProgress, NewUser, RecordProgress, RecordedProgress, User};

// Names are coalesced so rows written by older clients with NULL names still decode.
// Ids and timestamps are cast so SERIAL and TIMESTAMP columns decode as i64 and UTC.
// TIMESTAMP values are read in the session time zone.
const SELECT_USER_BY_TELEGRAM_ID: &str = r#"
    SELECT id::BIGINT AS id,
           telegram_id::BIGINT AS telegram_id,
           COALESCE(first_name, '') AS first_name,
           COALESCE(last_name, '') AS last_name,
           COALESCE(username, '') AS username
    FROM users
    WHERE telegram_id = $1
"#;

const INSERT_USER: &str = r#"
    INSERT INTO users (telegram_id, first_name, last_name, username)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (telegram_id) DO NOTHING
    RETURNING id::BIGINT AS id,
              telegram_id::BIGINT AS telegram_id,
              COALESCE(first_name, '') AS first_name,
              COALESCE(last_name, '') AS last_name,
              COALESCE(username, '') AS username
"#;

const SELECT_PROGRESS_BY_USER: &str = r#"
    SELECT user_id::BIGINT AS user_id,
           lesson_id,
           is_completed,
           completed_at::TIMESTAMPTZ AS completed_at,
           updated_at::TIMESTAMPTZ AS updated_at
    FROM lesson_progress
    WHERE user_id = $1
"#;

const UPSERT_PROGRESS: &str = r#"
    INSERT INTO lesson_progress (user_id, lesson_id, is_completed, completed_at, updated_at)
    VALUES (
        $1,
        $2,
        $3::BOOLEAN,
        CASE WHEN $3::BOOLEAN THEN CURRENT_TIMESTAMP ELSE NULL END,
        CURRENT_TIMESTAMP
    )
    ON CONFLICT (user_id, lesson_id)
    DO UPDATE SET
        is_completed = EXCLUDED.is_completed,
        completed_at = EXCLUDED.completed_at,
        updated_at = EXCLUDED.updated_at
    RETURNING user_id::BIGINT AS user_id,
              lesson_id,
              is_completed,
              completed_at::TIMESTAMPTZ AS completed_at,
              updated_at::TIMESTAMPTZ AS updated_at
"#;

/// PostgreSQL store for users and lesson progress
#[derive(Clone)]
pub struct PgProgressStore {
    pool: PgPool,
}

impl PgProgressStore {
    /// Creates a store whose pool opens connections on first use.
    /// Only the URL is validated here; nothing touches the network yet.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)
            .map_err(|e| map_sqlx_error("connect", e))?;

        info!(
            "Configured PostgreSQL pool (max_connections={})",
            max_connections
        );
        Ok(Self { pool })
    }

    /// Creates a store over an existing pool.
    /// This is mainly useful for testing with a local PostgreSQL instance.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_user(
        tx: &mut Transaction<'static, Postgres>,
        new_user: &NewUser,
    ) -> Result<(User, bool)> {
        if let Some(user) = select_user(&mut **tx, new_user.telegram_id).await? {
            return Ok((user, false));
        }

        let inserted = sqlx::query_as::<_, User>(INSERT_USER)
            .bind(new_user.telegram_id)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(&new_user.username)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("insert_user", e))?;

        match inserted {
            Some(user) => Ok((user, true)),
            None => {
                // Lost the race against a concurrent first contact; that row is committed now.
                debug!(
                    "User with telegram_id={} was created concurrently",
                    new_user.telegram_id
                );
                let user = select_user(&mut **tx, new_user.telegram_id)
                    .await?
                    .ok_or_else(|| {
                        map_sqlx_error("select_user", sqlx::Error::RowNotFound)
                    })?;
                Ok((user, false))
            }
        }
    }
}

async fn select_user(conn: &mut PgConnection, telegram_id: i64) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(SELECT_USER_BY_TELEGRAM_ID)
        .bind(telegram_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| map_sqlx_error("select_user", e))
}

#[async_trait]
impl super::ProgressStore for PgProgressStore {
    async fn find_user_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;

        select_user(&mut conn, telegram_id).await
    }

    async fn get_progress_for_user(&self, user_id: i64) -> Result<Vec<LessonProgress>> {
        sqlx::query_as::<_, LessonProgress>(SELECT_PROGRESS_BY_USER)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("select_progress", e))
    }

    /// Runs user creation and the progress upsert in one transaction.
    /// Dropping the transaction on an error path rolls both back.
    async fn record_progress(&self, command: RecordProgress) -> Result<RecordedProgress> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        let (user, user_created) = Self::ensure_user(&mut tx, &command.new_user()).await?;

        let progress = sqlx::query_as::<_, LessonProgress>(UPSERT_PROGRESS)
            .bind(user.id)
            .bind(&command.lesson_id)
            .bind(command.is_completed)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("upsert_progress", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        debug!(
            "Committed progress user_id={} lesson_id={} is_completed={}",
            user.id, progress.lesson_id, progress.is_completed
        );

        Ok(RecordedProgress {
            user,
            user_created,
            progress,
        })
    }
}
