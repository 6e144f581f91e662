//! # Postgres-backed clip store
//!
//! [`PgClipStore`] implements [`ClipStore`] over the `clips` table created by the
//! embedded migration. Each operation is a single statement, so updates are
//! atomic per record:
//!
//! - text uses `COALESCE($2, text)` so an absent value keeps the stored one;
//! - images pick between replace (`$3`), append (`array_append(images, $4)`) and
//!   keep, depending on which parameter is non-null.
//!
//! Duplicate ids surface as [`StoreError::Duplicate`] via the unique-violation
//! code of the primary key.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use store::{ClipSession, ClipStore, ClipUpdate, ImagesUpdate, StoreError};

use super::LazyPool;

/// One row of the `clips` table.
#[derive(Debug, Clone, FromRow)]
struct ClipRow {
    session_id: String,
    text: String,
    images: Vec<String>,
    created_at: DateTime<Utc>,
}

impl From<ClipRow> for ClipSession {
    fn from(row: ClipRow) -> Self {
        ClipSession {
            session_id: row.session_id,
            text: row.text,
            images: row.images,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgClipStore {
    pool: Arc<LazyPool>,
}

impl PgClipStore {
    pub fn new(pool: Arc<LazyPool>) -> Self {
        Self { pool }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl ClipStore for PgClipStore {
    async fn insert(&self, clip: ClipSession) -> Result<(), StoreError> {
        let pool = self.pool.get().await?;

        sqlx::query(
            "INSERT INTO clips (session_id, text, images, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&clip.session_id)
        .bind(&clip.text)
        .bind(&clip.images)
        .bind(clip.created_at)
        .execute(pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                StoreError::Duplicate(clip.session_id.clone())
            } else {
                backend(e)
            }
        })?;

        Ok(())
    }

    async fn find(&self, session_id: &str) -> Result<Option<ClipSession>, StoreError> {
        let pool = self.pool.get().await?;

        let row: Option<ClipRow> = sqlx::query_as(
            "SELECT session_id, text, images, created_at FROM clips WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await
        .map_err(backend)?;

        Ok(row.map(ClipSession::from))
    }

    async fn apply(
        &self,
        session_id: &str,
        update: &ClipUpdate,
    ) -> Result<Option<ClipSession>, StoreError> {
        let pool = self.pool.get().await?;

        let (replace, append): (Option<&Vec<String>>, Option<&String>) = match &update.images {
            Some(ImagesUpdate::Replace(images)) => (Some(images), None),
            Some(ImagesUpdate::Append(image)) => (None, Some(image)),
            None => (None, None),
        };

        let row: Option<ClipRow> = sqlx::query_as(
            "UPDATE clips SET
                text = COALESCE($2, text),
                images = CASE
                    WHEN $3::TEXT[] IS NOT NULL THEN $3::TEXT[]
                    WHEN $4::TEXT IS NOT NULL THEN array_append(images, $4::TEXT)
                    ELSE images
                END
             WHERE session_id = $1
             RETURNING session_id, text, images, created_at",
        )
        .bind(session_id)
        .bind(update.text.as_deref())
        .bind(replace)
        .bind(append)
        .fetch_optional(pool)
        .await
        .map_err(backend)?;

        Ok(row.map(ClipSession::from))
    }
}
