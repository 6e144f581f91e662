//! Storage backend chosen at startup from [`crate::settings::Storage`].

use std::sync::Arc;

use store::{ClipSession, ClipStore, ClipUpdate, MemoryStore, StoreError};

use crate::db::{LazyPool, PgClipStore};
use crate::settings::{Settings, StorageBackend};

#[derive(Clone, Debug)]
pub enum Backend {
    Memory(MemoryStore),
    Postgres(PgClipStore),
}

impl Backend {
    /// Build the configured backend. Postgres connects lazily on first use.
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.storage.backend {
            StorageBackend::Memory => Backend::Memory(MemoryStore::new()),
            StorageBackend::Postgres => {
                let pool = Arc::new(LazyPool::new(&settings.database));
                Backend::Postgres(PgClipStore::new(pool))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::Postgres(_) => "postgres",
        }
    }
}

impl ClipStore for Backend {
    async fn insert(&self, clip: ClipSession) -> Result<(), StoreError> {
        match self {
            Backend::Memory(store) => store.insert(clip).await,
            Backend::Postgres(store) => store.insert(clip).await,
        }
    }

    async fn find(&self, session_id: &str) -> Result<Option<ClipSession>, StoreError> {
        match self {
            Backend::Memory(store) => store.find(session_id).await,
            Backend::Postgres(store) => store.find(session_id).await,
        }
    }

    async fn apply(
        &self,
        session_id: &str,
        update: &ClipUpdate,
    ) -> Result<Option<ClipSession>, StoreError> {
        match self {
            Backend::Memory(store) => store.apply(session_id, update).await,
            Backend::Postgres(store) => store.apply(session_id, update).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_selection() {
        let mut settings = Settings::default();
        assert_eq!(Backend::from_settings(&settings).name(), "memory");

        settings.storage.backend = StorageBackend::Postgres;
        assert_eq!(Backend::from_settings(&settings).name(), "postgres");
    }

    #[tokio::test]
    async fn test_memory_backend_delegates() {
        let backend = Backend::Memory(MemoryStore::new());
        backend.insert(ClipSession::new("x")).await.unwrap();
        let updated = backend
            .apply("x", &ClipUpdate::text("y"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.text, "y");
        assert_eq!(backend.find("x").await.unwrap(), Some(updated));
    }
}
