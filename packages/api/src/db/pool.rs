//! Database connection pool, opened on first use.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use store::StoreError;
use tokio::sync::OnceCell;

use crate::settings::Database;

/// A Postgres pool that connects (and migrates) the first time it is needed.
///
/// Owned by whoever builds the store and handed down explicitly; there is no
/// process-wide instance.
#[derive(Debug)]
pub struct LazyPool {
    url: String,
    max_connections: u32,
    pool: OnceCell<PgPool>,
}

impl LazyPool {
    pub fn new(database: &Database) -> Self {
        Self {
            url: database.url(),
            max_connections: database.max_connections,
            pool: OnceCell::new(),
        }
    }

    /// Get or initialize the connection pool.
    pub async fn get(&self) -> Result<&PgPool, StoreError> {
        self.pool
            .get_or_try_init(|| async {
                let pool = PgPoolOptions::new()
                    .max_connections(self.max_connections)
                    .connect(&self.url)
                    .await
                    .map_err(|e| StoreError::Backend(e.to_string()))?;

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;

                tracing::info!("database pool ready");
                Ok(pool)
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_pool_starts_unconnected() {
        let settings = Settings::default();
        let pool = LazyPool::new(&settings.database);
        assert!(!pool.is_connected());
        assert_eq!(pool.max_connections, 5);
    }
}
